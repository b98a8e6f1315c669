use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Observation, WeoDataset};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Column names of the WEO source file, matched exactly.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "Country",
    "CCode",
    "weo_year",
    "exercise",
    "year",
    "Region",
    "incomegroup",
    "Fngdp_rpc",
    "pcpi_pch",
    "bca_gdp",
    "Rngdp_rpc",
    "Rpcpi_pch",
    "Rbca_gdp",
];

/// Inflation values outside ±100% (hyperinflation episodes such as
/// Zimbabwe's) are capped so they cannot dwarf every other series.
const INFLATION_CAP: f64 = 100.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Load-time failures. All variants are terminal for the session: the
/// dashboard shows the error instead of a partially working view.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("DATA_PATH is not set; add it to a .env file or export it before launching")]
    MissingConfiguration,

    #[error("dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("failed to load dataset: {0:#}")]
    LoadFailure(anyhow::Error),
}

/// Internal sentinel carried through the anyhow chain so `load_file` can
/// surface `LoadError::MissingColumns` instead of a generic failure.
#[derive(Debug)]
struct MissingColumnsError(Vec<String>);

impl fmt::Display for MissingColumnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required columns: {}", self.0.join(", "))
    }
}

impl std::error::Error for MissingColumnsError {}

/// Return the required columns absent from `available`, in schema order.
fn missing_required(available: &BTreeSet<&str>) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|col| !available.contains(**col))
        .map(|col| col.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a WEO panel from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – flat Arrow columns, one row per observation
/// * `.csv`     – header row with the required column names
/// * `.json`    – `[{ "Country": "...", "year": 2020, ... }, ...]`
pub fn load_file(path: &Path) -> Result<WeoDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let result = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(anyhow::anyhow!("unsupported file extension: .{other}")),
    };

    match result {
        Ok(dataset) => {
            log::info!(
                "Loaded {} observations, {} countries, years {}..={}",
                dataset.len(),
                dataset.countries.len(),
                dataset.year_min,
                dataset.year_max
            );
            Ok(dataset)
        }
        Err(err) => match err.downcast::<MissingColumnsError>() {
            Ok(missing) => Err(LoadError::MissingColumns(missing.0)),
            Err(other) => Err(LoadError::LoadFailure(other)),
        },
    }
}

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

/// Memoization table: source path → loaded dataset.
///
/// Each distinct path is read and parsed exactly once per process; later
/// lookups hand out the same `Arc`. The app threads one cache through
/// instead of relying on a process-wide singleton.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<WeoDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, or return the cached result of the first load.
    pub fn load(&mut self, path: &Path) -> Result<Arc<WeoDataset>, LoadError> {
        if let Some(dataset) = self.entries.get(path) {
            log::debug!("Dataset cache hit for {}", path.display());
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_file(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Shared parsing helpers
// ---------------------------------------------------------------------------

/// Clamp both inflation columns and build the dataset indices.
fn finish(mut rows: Vec<Observation>) -> WeoDataset {
    for row in &mut rows {
        row.forecast_inflation = row.forecast_inflation.map(clamp_inflation);
        row.realized_inflation = row.realized_inflation.map(clamp_inflation);
    }
    WeoDataset::from_rows(rows)
}

fn clamp_inflation(value: f64) -> f64 {
    value.clamp(-INFLATION_CAP, INFLATION_CAP)
}

/// Coerce a numeric cell to an integer year (floats are truncated, the
/// way a dataframe `astype(int)` would).
fn coerce_year(value: f64, row: usize, col: &str) -> Result<i32> {
    if !value.is_finite() {
        bail!("Row {row}: '{col}' is not a finite number");
    }
    Ok(value.trunc() as i32)
}

fn parse_required_int(s: &str, row: usize, col: &str) -> Result<i32> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        bail!("Row {row}: '{col}' is empty");
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(i as i32);
    }
    let f = trimmed
        .parse::<f64>()
        .with_context(|| format!("Row {row}: '{col}' value '{trimmed}' is not numeric"))?;
    coerce_year(f, row, col)
}

/// Optional metric cell: empty and non-finite values count as missing.
fn parse_optional_f64(s: &str, row: usize, col: &str) -> Result<Option<f64>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = trimmed
        .parse::<f64>()
        .with_context(|| format!("Row {row}: '{col}' value '{trimmed}' is not numeric"))?;
    Ok(value.is_finite().then_some(value))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<WeoDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let available: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    let missing = missing_required(&available);
    if !missing.is_empty() {
        return Err(MissingColumnsError(missing).into());
    }

    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();
    let cell = |record: &csv::StringRecord, col: &str| -> String {
        record.get(index[col]).unwrap_or("").to_string()
    };

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(Observation {
            country: cell(&record, "Country").trim().to_string(),
            country_code: cell(&record, "CCode").trim().to_string(),
            weo_year: parse_required_int(&cell(&record, "weo_year"), row_no, "weo_year")?,
            exercise: parse_required_int(&cell(&record, "exercise"), row_no, "exercise")?,
            year: parse_required_int(&cell(&record, "year"), row_no, "year")?,
            region: non_empty(&cell(&record, "Region")),
            income_group: non_empty(&cell(&record, "incomegroup")),
            forecast_gdp_growth: parse_optional_f64(&cell(&record, "Fngdp_rpc"), row_no, "Fngdp_rpc")?,
            forecast_inflation: parse_optional_f64(&cell(&record, "pcpi_pch"), row_no, "pcpi_pch")?,
            forecast_current_account: parse_optional_f64(&cell(&record, "bca_gdp"), row_no, "bca_gdp")?,
            realized_gdp_growth: parse_optional_f64(&cell(&record, "Rngdp_rpc"), row_no, "Rngdp_rpc")?,
            realized_inflation: parse_optional_f64(&cell(&record, "Rpcpi_pch"), row_no, "Rpcpi_pch")?,
            realized_current_account: parse_optional_f64(&cell(&record, "Rbca_gdp"), row_no, "Rbca_gdp")?,
        });
    }

    Ok(finish(rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
/// one object per observation, keyed by the source column names.
fn load_json(path: &Path) -> Result<WeoDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    // Column set is the union of keys across records, mirroring how a
    // dataframe reader infers columns.
    let mut available: BTreeSet<&str> = BTreeSet::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            available.extend(obj.keys().map(String::as_str));
        }
    }
    let missing = missing_required(&available);
    if !missing.is_empty() {
        return Err(MissingColumnsError(missing).into());
    }

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let string_field = |col: &str| -> String {
            obj.get(col)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string()
        };
        let int_field = |col: &str| -> Result<i32> {
            let value = obj
                .get(col)
                .and_then(|v| v.as_f64())
                .with_context(|| format!("Row {i}: '{col}' is missing or not numeric"))?;
            coerce_year(value, i, col)
        };
        let metric_field = |col: &str| -> Option<f64> {
            obj.get(col).and_then(|v| v.as_f64()).filter(|v| v.is_finite())
        };

        rows.push(Observation {
            country: string_field("Country"),
            country_code: string_field("CCode"),
            weo_year: int_field("weo_year")?,
            exercise: int_field("exercise")?,
            year: int_field("year")?,
            region: non_empty(&string_field("Region")),
            income_group: non_empty(&string_field("incomegroup")),
            forecast_gdp_growth: metric_field("Fngdp_rpc"),
            forecast_inflation: metric_field("pcpi_pch"),
            forecast_current_account: metric_field("bca_gdp"),
            realized_gdp_growth: metric_field("Rngdp_rpc"),
            realized_inflation: metric_field("Rpcpi_pch"),
            realized_current_account: metric_field("Rbca_gdp"),
        });
    }

    Ok(finish(rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat-column Parquet, as written by `df.to_parquet()` or by the bundled
/// `generate_sample` binary. Strings may be Utf8 or LargeUtf8, numerics may
/// be 32- or 64-bit; both widths are accepted.
fn load_parquet(path: &Path) -> Result<WeoDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema_fields: BTreeSet<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let available: BTreeSet<&str> = schema_fields.iter().map(String::as_str).collect();
    let missing = missing_required(&available);
    if !missing.is_empty() {
        return Err(MissingColumnsError(missing).into());
    }

    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &str| -> Result<&Arc<dyn Array>> {
            let idx = schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet batch missing '{name}' column"))?;
            Ok(batch.column(idx))
        };

        let country = column("Country")?;
        let country_code = column("CCode")?;
        let weo_year = column("weo_year")?;
        let exercise = column("exercise")?;
        let year = column("year")?;
        let region = column("Region")?;
        let income_group = column("incomegroup")?;
        let f_gdp = column("Fngdp_rpc")?;
        let f_inf = column("pcpi_pch")?;
        let f_bca = column("bca_gdp")?;
        let r_gdp = column("Rngdp_rpc")?;
        let r_inf = column("Rpcpi_pch")?;
        let r_bca = column("Rbca_gdp")?;

        for row in 0..batch.num_rows() {
            let int_cell = |col: &Arc<dyn Array>, name: &str| -> Result<i32> {
                let value = f64_at(col, row)
                    .with_context(|| format!("Row {row}: '{name}' is null or not numeric"))?;
                coerce_year(value, row, name)
            };

            rows.push(Observation {
                country: string_at(country, row).unwrap_or_default(),
                country_code: string_at(country_code, row).unwrap_or_default(),
                weo_year: int_cell(weo_year, "weo_year")?,
                exercise: int_cell(exercise, "exercise")?,
                year: int_cell(year, "year")?,
                region: string_at(region, row),
                income_group: string_at(income_group, row),
                forecast_gdp_growth: f64_at(f_gdp, row).filter(|v| v.is_finite()),
                forecast_inflation: f64_at(f_inf, row).filter(|v| v.is_finite()),
                forecast_current_account: f64_at(f_bca, row).filter(|v| v.is_finite()),
                realized_gdp_growth: f64_at(r_gdp, row).filter(|v| v.is_finite()),
                realized_inflation: f64_at(r_inf, row).filter(|v| v.is_finite()),
                realized_current_account: f64_at(r_bca, row).filter(|v| v.is_finite()),
            });
        }
    }

    Ok(finish(rows))
}

// -- Parquet / Arrow helpers --

/// Extract a string cell, treating nulls and empty strings as absent.
fn string_at(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|arr| arr.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }?;
    non_empty(&text)
}

/// Extract a numeric cell as `f64` from any supported numeric width.
fn f64_at(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|arr| arr.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|arr| arr.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|arr| arr.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|arr| arr.value(row) as f64),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Metric, Variant};
    use std::io::Write;

    const HEADER: &str =
        "Country,CCode,weo_year,exercise,year,Region,incomegroup,Fngdp_rpc,pcpi_pch,bca_gdp,Rngdp_rpc,Rpcpi_pch,Rbca_gdp";

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        for line in lines {
            writeln!(file, "{line}").expect("write temp csv");
        }
        file.flush().expect("flush temp csv");
        file
    }

    #[test]
    fn loads_csv_and_coerces_year() {
        let file = write_csv(&[
            HEADER,
            "Brazil,BRA,2020,1,2020.0,Latin America,Upper middle,-4.0,3.2,-1.7,-3.9,3.2,-1.8",
            "Brazil,BRA,2021,1,2021,Latin America,Upper middle,4.6,8.3,-1.6,4.6,8.3,-1.7",
        ]);
        let ds = load_file(file.path()).expect("load");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0].year, 2020);
        assert_eq!(ds.rows[1].year, 2021);
        assert_eq!(ds.rows[0].value(Metric::GdpGrowth, Variant::Forecast), Some(-4.0));
        assert_eq!((ds.year_min, ds.year_max), (2020, 2021));
    }

    #[test]
    fn clamps_inflation_to_plus_minus_100() {
        let file = write_csv(&[
            HEADER,
            "World,WLD,2020,1,2020,,,1.0,250.0,0.5,1.1,-150.0,0.4",
            "Brazil,BRA,2020,1,2020,Latin America,Upper middle,-4.0,3.2,-1.7,-3.9,99.9,-1.8",
        ]);
        let ds = load_file(file.path()).expect("load");
        // Outliers capped, in-range values untouched.
        assert_eq!(ds.rows[0].forecast_inflation, Some(100.0));
        assert_eq!(ds.rows[0].realized_inflation, Some(-100.0));
        assert_eq!(ds.rows[1].forecast_inflation, Some(3.2));
        assert_eq!(ds.rows[1].realized_inflation, Some(99.9));
        // Non-inflation columns pass through unmodified.
        assert_eq!(ds.rows[0].forecast_gdp_growth, Some(1.0));
    }

    #[test]
    fn clamp_is_idempotent() {
        assert_eq!(clamp_inflation(250.0), 100.0);
        assert_eq!(clamp_inflation(clamp_inflation(250.0)), 100.0);
        assert_eq!(clamp_inflation(-100.0), -100.0);
        assert_eq!(clamp_inflation(42.5), 42.5);
    }

    #[test]
    fn missing_columns_are_listed_exactly() {
        let file = write_csv(&[
            "Country,CCode,weo_year,exercise,year,Region,Fngdp_rpc,pcpi_pch,bca_gdp,Rngdp_rpc,Rbca_gdp",
            "Brazil,BRA,2020,1,2020,Latin America,-4.0,3.2,-1.7,-3.9,-1.8",
        ]);
        match load_file(file.path()) {
            Err(LoadError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["incomegroup".to_string(), "Rpcpi_pch".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn empty_metric_cells_become_none() {
        let file = write_csv(&[
            HEADER,
            "Brazil,BRA,2020,1,2020,Latin America,Upper middle,,3.2,,,,",
        ]);
        let ds = load_file(file.path()).expect("load");
        assert_eq!(ds.rows[0].forecast_gdp_growth, None);
        assert_eq!(ds.rows[0].forecast_inflation, Some(3.2));
        assert_eq!(ds.rows[0].realized_current_account, None);
    }

    #[test]
    fn unsupported_extension_is_load_failure() {
        let file = tempfile::Builder::new()
            .suffix(".xls")
            .tempfile()
            .expect("create temp file");
        match load_file(file.path()) {
            Err(LoadError::LoadFailure(err)) => {
                assert!(err.to_string().contains("unsupported file extension"));
            }
            other => panic!("expected LoadFailure, got {other:?}"),
        }
    }

    #[test]
    fn loads_records_oriented_json() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("create temp json");
        write!(
            file,
            r#"[{{"Country":"Brazil","CCode":"BRA","weo_year":2020,"exercise":1,"year":2020,
                "Region":"Latin America","incomegroup":"Upper middle",
                "Fngdp_rpc":-4.0,"pcpi_pch":3.2,"bca_gdp":-1.7,
                "Rngdp_rpc":-3.9,"Rpcpi_pch":320.0,"Rbca_gdp":-1.8}}]"#
        )
        .expect("write temp json");
        file.flush().expect("flush temp json");

        let ds = load_file(file.path()).expect("load");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows[0].country, "Brazil");
        assert_eq!(ds.rows[0].realized_inflation, Some(100.0));
    }

    #[test]
    fn cache_loads_each_path_once() {
        let file = write_csv(&[
            HEADER,
            "Brazil,BRA,2020,1,2020,Latin America,Upper middle,-4.0,3.2,-1.7,-3.9,3.2,-1.8",
        ]);
        let mut cache = DatasetCache::new();
        let first = cache.load(file.path()).expect("first load");
        let second = cache.load(file.path()).expect("second load");
        assert!(Arc::ptr_eq(&first, &second));
    }
}
