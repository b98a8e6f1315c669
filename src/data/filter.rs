use std::collections::BTreeSet;

use super::model::WeoDataset;

// ---------------------------------------------------------------------------
// Filter selection: the conjunction of user-chosen predicates
// ---------------------------------------------------------------------------

/// The sidebar filter state. All predicates combine by logical AND.
///
/// `region` / `income_group` of `None` are the "All …" sentinel: the
/// predicate is disabled. An empty `countries` set is *not* a predicate at
/// all; it is the [`NoSelection`] condition and blocks filtering entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    /// Countries/aggregates to keep. Must be non-empty to filter.
    pub countries: BTreeSet<String>,
    /// Inclusive (min, max) bound on the observation year.
    pub year_range: (i32, i32),
    /// Optional region equality filter.
    pub region: Option<String>,
    /// Optional income-group equality filter.
    pub income_group: Option<String>,
}

impl FilterSelection {
    /// Selection covering the whole dataset: every country, the full year
    /// span, both equality filters disabled.
    pub fn all(dataset: &WeoDataset) -> Self {
        FilterSelection {
            countries: dataset.countries.iter().cloned().collect(),
            year_range: (dataset.year_min, dataset.year_max),
            region: None,
            income_group: None,
        }
    }
}

/// The user has deselected every country. Recoverable: the UI prompts for
/// a selection instead of scanning the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSelection;

/// Return indices of observations passing all active filters, in original
/// row order.
///
/// Refuses to scan when the country set is empty; an empty *result* on the
/// other hand is perfectly valid and downstream views degrade gracefully.
pub fn filtered_indices(
    dataset: &WeoDataset,
    selection: &FilterSelection,
) -> Result<Vec<usize>, NoSelection> {
    if selection.countries.is_empty() {
        return Err(NoSelection);
    }

    let (year_min, year_max) = selection.year_range;
    Ok(dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            if !selection.countries.contains(&row.country) {
                return false;
            }
            if row.year < year_min || row.year > year_max {
                return false;
            }
            if let Some(region) = &selection.region {
                if row.region.as_ref() != Some(region) {
                    return false;
                }
            }
            if let Some(group) = &selection.income_group {
                if row.income_group.as_ref() != Some(group) {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    fn obs(country: &str, year: i32, region: &str, income: &str, gdp: f64) -> Observation {
        Observation {
            country: country.to_string(),
            country_code: String::new(),
            weo_year: year,
            exercise: 1,
            year,
            region: (!region.is_empty()).then(|| region.to_string()),
            income_group: (!income.is_empty()).then(|| income.to_string()),
            forecast_gdp_growth: Some(gdp),
            forecast_inflation: None,
            forecast_current_account: None,
            realized_gdp_growth: None,
            realized_inflation: None,
            realized_current_account: None,
        }
    }

    fn sample() -> WeoDataset {
        WeoDataset::from_rows(vec![
            obs("Brazil", 2020, "Latin America", "Upper middle", -4.0),
            obs("Brazil", 2021, "Latin America", "Upper middle", 4.6),
            obs("United States", 2020, "North America", "High", -3.4),
            obs("World", 2020, "", "", -3.1),
            obs("Chile", 1995, "Latin America", "High", 8.9),
        ])
    }

    fn countries(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn empty_country_selection_never_scans() {
        let ds = sample();
        let selection = FilterSelection {
            countries: BTreeSet::new(),
            year_range: (ds.year_min, ds.year_max),
            region: None,
            income_group: None,
        };
        assert_eq!(filtered_indices(&ds, &selection), Err(NoSelection));
    }

    #[test]
    fn identity_filter_returns_every_row() {
        let ds = sample();
        let selection = FilterSelection::all(&ds);
        let idx = filtered_indices(&ds, &selection).expect("non-empty selection");
        assert_eq!(idx, (0..ds.len()).collect::<Vec<_>>());
    }

    #[test]
    fn retained_rows_satisfy_all_predicates() {
        let ds = sample();
        let selection = FilterSelection {
            countries: countries(&["Brazil", "Chile", "United States"]),
            year_range: (2000, 2021),
            region: Some("Latin America".to_string()),
            income_group: Some("Upper middle".to_string()),
        };
        let idx = filtered_indices(&ds, &selection).expect("non-empty selection");
        for &i in &idx {
            let row = &ds.rows[i];
            assert!(selection.countries.contains(&row.country));
            assert!((2000..=2021).contains(&row.year));
            assert_eq!(row.region.as_deref(), Some("Latin America"));
            assert_eq!(row.income_group.as_deref(), Some("Upper middle"));
        }
        // Every excluded row violates at least one predicate.
        for i in 0..ds.len() {
            if !idx.contains(&i) {
                let row = &ds.rows[i];
                let passes = selection.countries.contains(&row.country)
                    && (2000..=2021).contains(&row.year)
                    && row.region.as_deref() == Some("Latin America")
                    && row.income_group.as_deref() == Some("Upper middle");
                assert!(!passes, "row {i} passes all predicates but was excluded");
            }
        }
        assert_eq!(idx, vec![0, 1]);
    }

    #[test]
    fn brazil_year_range_returns_both_years_in_order() {
        let ds = sample();
        let selection = FilterSelection {
            countries: countries(&["Brazil"]),
            year_range: (2020, 2021),
            region: None,
            income_group: None,
        };
        let idx = filtered_indices(&ds, &selection).expect("non-empty selection");
        assert_eq!(idx.len(), 2);
        assert_eq!(ds.rows[idx[0]].year, 2020);
        assert_eq!(ds.rows[idx[1]].year, 2021);
        assert!(idx.iter().all(|&i| ds.rows[i].country == "Brazil"));
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let ds = sample();
        let selection = FilterSelection {
            countries: countries(&["Chile"]),
            year_range: (1995, 1995),
            region: None,
            income_group: None,
        };
        let idx = filtered_indices(&ds, &selection).expect("non-empty selection");
        assert_eq!(idx, vec![4]);
    }

    #[test]
    fn empty_result_is_ok_not_an_error() {
        let ds = sample();
        let selection = FilterSelection {
            countries: countries(&["World"]),
            year_range: (2020, 2021),
            region: Some("Latin America".to_string()),
            income_group: None,
        };
        // "World" has no region, so the equality filter excludes it.
        let idx = filtered_indices(&ds, &selection).expect("non-empty selection");
        assert!(idx.is_empty());
    }
}
