use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Metric / Variant – which column a chart or table reads
// ---------------------------------------------------------------------------

/// The three WEO variables tracked by the dashboard.
///
/// Each metric exists in a forecast and a realized flavour; the column pair
/// is an explicit lookup here, never derived from column-name prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    GdpGrowth,
    Inflation,
    CurrentAccount,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::GdpGrowth, Metric::Inflation, Metric::CurrentAccount];

    /// Human-readable label for widgets and chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::GdpGrowth => "GDP growth",
            Metric::Inflation => "Inflation",
            Metric::CurrentAccount => "Current account balance",
        }
    }

    /// Source column holding the forecast values.
    pub fn forecast_column(&self) -> &'static str {
        match self {
            Metric::GdpGrowth => "Fngdp_rpc",
            Metric::Inflation => "pcpi_pch",
            Metric::CurrentAccount => "bca_gdp",
        }
    }

    /// Source column holding the realized (actual) values.
    pub fn realized_column(&self) -> &'static str {
        match self {
            Metric::GdpGrowth => "Rngdp_rpc",
            Metric::Inflation => "Rpcpi_pch",
            Metric::CurrentAccount => "Rbca_gdp",
        }
    }

    pub fn column(&self, variant: Variant) -> &'static str {
        match variant {
            Variant::Forecast => self.forecast_column(),
            Variant::Realized => self.realized_column(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Forecast vs. realized flavour of a [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Forecast,
    Realized,
}

impl Variant {
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Forecast => "Forecast",
            Variant::Realized => "Realized",
        }
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the WEO panel
// ---------------------------------------------------------------------------

/// One (country-or-aggregate, year) row of the loaded dataset.
///
/// `country` may name an aggregate such as "World"; `region` and
/// `income_group` are null for aggregates and so optional here. Metric cells
/// absent from the source stay `None` and are skipped by means and charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub country_code: String,
    pub weo_year: i32,
    pub exercise: i32,
    pub year: i32,
    pub region: Option<String>,
    pub income_group: Option<String>,
    pub forecast_gdp_growth: Option<f64>,
    pub forecast_inflation: Option<f64>,
    pub forecast_current_account: Option<f64>,
    pub realized_gdp_growth: Option<f64>,
    pub realized_inflation: Option<f64>,
    pub realized_current_account: Option<f64>,
}

impl Observation {
    /// Typed access to one metric cell; the only read path the charts,
    /// aggregation, and table use.
    pub fn value(&self, metric: Metric, variant: Variant) -> Option<f64> {
        match (metric, variant) {
            (Metric::GdpGrowth, Variant::Forecast) => self.forecast_gdp_growth,
            (Metric::Inflation, Variant::Forecast) => self.forecast_inflation,
            (Metric::CurrentAccount, Variant::Forecast) => self.forecast_current_account,
            (Metric::GdpGrowth, Variant::Realized) => self.realized_gdp_growth,
            (Metric::Inflation, Variant::Realized) => self.realized_inflation,
            (Metric::CurrentAccount, Variant::Realized) => self.realized_current_account,
        }
    }
}

// ---------------------------------------------------------------------------
// WeoDataset – the complete loaded panel
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed widget option lists.
///
/// Immutable after load: filtering produces index views over `rows`, the
/// rows themselves are never touched again.
#[derive(Debug, Clone)]
pub struct WeoDataset {
    /// All observations, in source row order.
    pub rows: Vec<Observation>,
    /// Sorted unique country/aggregate names (empty names dropped).
    pub countries: Vec<String>,
    /// Sorted unique regions (nulls dropped).
    pub regions: Vec<String>,
    /// Sorted unique income groups (nulls dropped).
    pub income_groups: Vec<String>,
    /// Smallest observation year in the panel.
    pub year_min: i32,
    /// Largest observation year in the panel.
    pub year_max: i32,
}

impl WeoDataset {
    /// Build the option indices from loaded rows.
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        let mut countries: BTreeSet<String> = BTreeSet::new();
        let mut regions: BTreeSet<String> = BTreeSet::new();
        let mut income_groups: BTreeSet<String> = BTreeSet::new();
        let mut year_min = i32::MAX;
        let mut year_max = i32::MIN;

        for row in &rows {
            if !row.country.is_empty() {
                countries.insert(row.country.clone());
            }
            if let Some(region) = &row.region {
                regions.insert(region.clone());
            }
            if let Some(group) = &row.income_group {
                income_groups.insert(group.clone());
            }
            year_min = year_min.min(row.year);
            year_max = year_max.max(row.year);
        }

        if rows.is_empty() {
            year_min = 0;
            year_max = 0;
        }

        WeoDataset {
            rows,
            countries: countries.into_iter().collect(),
            regions: regions.into_iter().collect(),
            income_groups: income_groups.into_iter().collect(),
            year_min,
            year_max,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, year: i32, region: Option<&str>) -> Observation {
        Observation {
            country: country.to_string(),
            country_code: country.chars().take(3).collect::<String>().to_uppercase(),
            weo_year: year,
            exercise: 1,
            year,
            region: region.map(str::to_string),
            income_group: None,
            forecast_gdp_growth: None,
            forecast_inflation: None,
            forecast_current_account: None,
            realized_gdp_growth: None,
            realized_inflation: None,
            realized_current_account: None,
        }
    }

    #[test]
    fn metric_column_pairs_are_fixed() {
        assert_eq!(Metric::GdpGrowth.forecast_column(), "Fngdp_rpc");
        assert_eq!(Metric::GdpGrowth.realized_column(), "Rngdp_rpc");
        assert_eq!(Metric::Inflation.forecast_column(), "pcpi_pch");
        assert_eq!(Metric::Inflation.realized_column(), "Rpcpi_pch");
        assert_eq!(Metric::CurrentAccount.forecast_column(), "bca_gdp");
        assert_eq!(Metric::CurrentAccount.realized_column(), "Rbca_gdp");
        assert_eq!(
            Metric::Inflation.column(Variant::Realized),
            Metric::Inflation.realized_column()
        );
    }

    #[test]
    fn value_reads_the_matching_cell() {
        let mut row = obs("Brazil", 2020, Some("Latin America"));
        row.forecast_gdp_growth = Some(-4.0);
        row.realized_inflation = Some(3.2);
        assert_eq!(row.value(Metric::GdpGrowth, Variant::Forecast), Some(-4.0));
        assert_eq!(row.value(Metric::Inflation, Variant::Realized), Some(3.2));
        assert_eq!(row.value(Metric::CurrentAccount, Variant::Forecast), None);
    }

    #[test]
    fn from_rows_builds_sorted_unique_options() {
        let ds = WeoDataset::from_rows(vec![
            obs("World", 2021, None),
            obs("Brazil", 2020, Some("Latin America")),
            obs("Brazil", 2021, Some("Latin America")),
            obs("Chile", 1995, Some("Latin America")),
        ]);
        assert_eq!(ds.countries, vec!["Brazil", "Chile", "World"]);
        assert_eq!(ds.regions, vec!["Latin America"]);
        assert!(ds.income_groups.is_empty());
        assert_eq!((ds.year_min, ds.year_max), (1995, 2021));
        assert_eq!(ds.len(), 4);
    }
}
