use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config;
use crate::data::aggregate::GroupBy;
use crate::data::filter::{filtered_indices, FilterSelection, NoSelection};
use crate::data::loader::DatasetCache;
use crate::data::model::{Metric, Variant, WeoDataset};

/// Countries pre-selected on first load when the dataset has them.
const DEFAULT_COUNTRIES: [&str; 3] = ["Brazil", "United States", "World"];

// ---------------------------------------------------------------------------
// Chart options
// ---------------------------------------------------------------------------

/// What the central panel is currently showing.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Forecast vs. realized flavour of the chosen metric.
    pub variant: Variant,
    /// Which metric the line chart, bar chart, and table show.
    pub metric: Metric,
    /// Grouping for the comparison bar chart.
    pub group_by: GroupBy,
    /// Year the bar chart (and scatter) compare; kept within the years
    /// present in the filtered view.
    pub comparison_year: Option<i32>,
    /// Forecast-vs-realized scatter toggle. Only meaningful while the
    /// forecast variant is selected.
    pub show_scatter: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            variant: Variant::Forecast,
            metric: Metric::GdpGrowth,
            group_by: GroupBy::Country,
            comparison_year: None,
            show_scatter: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Memoized loads, keyed by source path.
    pub cache: DatasetCache,

    /// Loaded dataset (None until the configured file loads).
    pub dataset: Option<Arc<WeoDataset>>,

    /// Sidebar filter selections.
    pub selection: FilterSelection,

    /// Indices of observations passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// True while every country is deselected; the views pause instead of
    /// scanning the table.
    pub no_selection: bool,

    /// Central-panel chart options.
    pub charts: ChartOptions,

    /// Stable per-country colours for the line and scatter charts.
    pub color_map: ColorMap,

    /// Load-time failure. Terminal: no partial dashboard is shown.
    pub fatal_error: Option<String>,

    /// Transient status shown in the top bar (e.g. export outcome).
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: DatasetCache::new(),
            dataset: None,
            selection: FilterSelection {
                countries: BTreeSet::new(),
                year_range: (0, 0),
                region: None,
                income_group: None,
            },
            visible_indices: Vec::new(),
            no_selection: false,
            charts: ChartOptions::default(),
            color_map: ColorMap::default(),
            fatal_error: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Resolve `DATA_PATH` and load the dataset through the cache. Any
    /// failure is fatal and recorded for the error screen.
    pub fn load_from_config(&mut self) {
        let path = match config::data_path() {
            Ok(path) => path,
            Err(err) => {
                log::error!("{err}");
                self.fatal_error = Some(err.to_string());
                return;
            }
        };
        self.load_path(&path);
    }

    fn load_path(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(err) => {
                log::error!("Failed to load {}: {err}", path.display());
                self.fatal_error = Some(err.to_string());
            }
        }
    }

    /// Ingest a loaded dataset: default country selection, full year span,
    /// equality filters off.
    pub fn set_dataset(&mut self, dataset: Arc<WeoDataset>) {
        let defaults: BTreeSet<String> = DEFAULT_COUNTRIES
            .iter()
            .map(|c| c.to_string())
            .filter(|c| dataset.countries.binary_search(c).is_ok())
            .collect();
        let countries = if defaults.len() == DEFAULT_COUNTRIES.len() {
            defaults
        } else {
            // Fall back to the first country so something is visible.
            dataset.countries.iter().take(1).cloned().collect()
        };

        self.selection = FilterSelection {
            countries,
            year_range: (dataset.year_min, dataset.year_max),
            region: None,
            income_group: None,
        };
        self.charts = ChartOptions::default();
        self.fatal_error = None;
        self.status_message = None;
        self.dataset = Some(dataset);
        self.rebuild_color_map();
        self.refilter();
    }

    /// Recompute the visible view after any filter change. Never scans the
    /// table while the country selection is empty.
    pub fn refilter(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        match filtered_indices(dataset, &self.selection) {
            Ok(indices) => {
                log::debug!("Filter retained {} of {} rows", indices.len(), dataset.len());
                self.visible_indices = indices;
                self.no_selection = false;
            }
            Err(NoSelection) => {
                self.visible_indices.clear();
                self.no_selection = true;
            }
        }
        self.sync_comparison_year();
    }

    /// Sorted unique years present in the visible view.
    pub fn visible_years(&self) -> Vec<i32> {
        let Some(dataset) = &self.dataset else {
            return Vec::new();
        };
        let years: BTreeSet<i32> = self
            .visible_indices
            .iter()
            .map(|&i| dataset.rows[i].year)
            .collect();
        years.into_iter().collect()
    }

    /// Keep the comparison year inside the visible view; defaults to the
    /// earliest visible year.
    fn sync_comparison_year(&mut self) {
        let years = self.visible_years();
        match self.charts.comparison_year {
            Some(year) if years.contains(&year) => {}
            _ => self.charts.comparison_year = years.first().copied(),
        }
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = ColorMap::new(&self.selection.countries);
    }

    /// Toggle one country in the multi-select.
    pub fn toggle_country(&mut self, country: &str) {
        if !self.selection.countries.remove(country) {
            self.selection.countries.insert(country.to_string());
        }
        self.rebuild_color_map();
        self.refilter();
    }

    /// Select every country in the dataset.
    pub fn select_all_countries(&mut self) {
        if let Some(dataset) = &self.dataset {
            self.selection.countries = dataset.countries.iter().cloned().collect();
        }
        self.rebuild_color_map();
        self.refilter();
    }

    /// Deselect every country (enters the no-selection condition).
    pub fn select_no_countries(&mut self) {
        self.selection.countries.clear();
        self.rebuild_color_map();
        self.refilter();
    }

    /// Set the inclusive year range, keeping min ≤ max.
    pub fn set_year_range(&mut self, min: i32, max: i32) {
        self.selection.year_range = (min.min(max), min.max(max));
        self.refilter();
    }

    /// Whether the export button should be enabled.
    pub fn can_export(&self) -> bool {
        !self.visible_indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    fn obs(country: &str, year: i32) -> Observation {
        Observation {
            country: country.to_string(),
            country_code: String::new(),
            weo_year: year,
            exercise: 1,
            year,
            region: None,
            income_group: None,
            forecast_gdp_growth: Some(1.0),
            forecast_inflation: None,
            forecast_current_account: None,
            realized_gdp_growth: None,
            realized_inflation: None,
            realized_current_account: None,
        }
    }

    fn dataset() -> Arc<WeoDataset> {
        Arc::new(WeoDataset::from_rows(vec![
            obs("Brazil", 2020),
            obs("Brazil", 2021),
            obs("United States", 2020),
            obs("World", 2019),
            obs("Chile", 2018),
        ]))
    }

    #[test]
    fn set_dataset_selects_defaults_and_full_span() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        let selected: Vec<&String> = state.selection.countries.iter().collect();
        assert_eq!(selected, ["Brazil", "United States", "World"]);
        assert_eq!(state.selection.year_range, (2018, 2021));
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert!(!state.no_selection);
    }

    #[test]
    fn deselecting_everything_pauses_filtering() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.select_no_countries();
        assert!(state.no_selection);
        assert!(state.visible_indices.is_empty());
        assert!(!state.can_export());

        state.toggle_country("Brazil");
        assert!(!state.no_selection);
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert!(state.can_export());
    }

    #[test]
    fn comparison_year_follows_the_visible_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        assert_eq!(state.charts.comparison_year, Some(2019));

        state.charts.comparison_year = Some(2021);
        state.set_year_range(2019, 2020);
        // 2021 fell out of the view, so the year snaps back.
        assert_eq!(state.charts.comparison_year, Some(2019));
    }

    #[test]
    fn year_range_is_normalized() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.set_year_range(2021, 2019);
        assert_eq!(state.selection.year_range, (2019, 2021));
    }
}
