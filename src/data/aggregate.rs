use std::collections::BTreeMap;

use super::model::{Metric, Variant, WeoDataset};

// ---------------------------------------------------------------------------
// Group-wise means for the comparison bar chart
// ---------------------------------------------------------------------------

/// Grouping key for the comparison view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Country,
    Region,
}

impl GroupBy {
    pub fn label(&self) -> &'static str {
        match self {
            GroupBy::Country => "Country",
            GroupBy::Region => "Region",
        }
    }
}

/// Mean of one metric per group, for a single comparison year, computed
/// over the filtered view given by `indices`.
///
/// Missing cells are ignored (mean of present values); groups with no
/// present value, or a null grouping key, are omitted. The `BTreeMap`
/// iterates alphabetically, which is the display order the bar chart uses.
pub fn group_mean(
    dataset: &WeoDataset,
    indices: &[usize],
    metric: Metric,
    variant: Variant,
    year: i32,
    group_by: GroupBy,
) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for &i in indices {
        let row = &dataset.rows[i];
        if row.year != year {
            continue;
        }
        let key = match group_by {
            GroupBy::Country => {
                if row.country.is_empty() {
                    continue;
                }
                row.country.clone()
            }
            GroupBy::Region => match &row.region {
                Some(region) => region.clone(),
                None => continue,
            },
        };
        if let Some(value) = row.value(metric, variant) {
            let entry = sums.entry(key).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}
