use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{Observation, WeoDataset};

/// Fixed download name for the filtered-view export.
pub const EXPORT_FILE_NAME: &str = "weo_filtered_data.csv";

/// One export row under the original source column names, so a round trip
/// through the CSV loader sees the same schema.
#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "CCode")]
    country_code: &'a str,
    #[serde(rename = "weo_year")]
    weo_year: i32,
    #[serde(rename = "exercise")]
    exercise: i32,
    #[serde(rename = "year")]
    year: i32,
    #[serde(rename = "Region")]
    region: Option<&'a str>,
    #[serde(rename = "incomegroup")]
    income_group: Option<&'a str>,
    #[serde(rename = "Fngdp_rpc")]
    forecast_gdp_growth: Option<f64>,
    #[serde(rename = "pcpi_pch")]
    forecast_inflation: Option<f64>,
    #[serde(rename = "bca_gdp")]
    forecast_current_account: Option<f64>,
    #[serde(rename = "Rngdp_rpc")]
    realized_gdp_growth: Option<f64>,
    #[serde(rename = "Rpcpi_pch")]
    realized_inflation: Option<f64>,
    #[serde(rename = "Rbca_gdp")]
    realized_current_account: Option<f64>,
}

impl<'a> From<&'a Observation> for ExportRow<'a> {
    fn from(row: &'a Observation) -> Self {
        ExportRow {
            country: &row.country,
            country_code: &row.country_code,
            weo_year: row.weo_year,
            exercise: row.exercise,
            year: row.year,
            region: row.region.as_deref(),
            income_group: row.income_group.as_deref(),
            forecast_gdp_growth: row.forecast_gdp_growth,
            forecast_inflation: row.forecast_inflation,
            forecast_current_account: row.forecast_current_account,
            realized_gdp_growth: row.realized_gdp_growth,
            realized_inflation: row.realized_inflation,
            realized_current_account: row.realized_current_account,
        }
    }
}

/// Serialize the filtered view (in its current row order) as CSV text.
pub fn to_csv(dataset: &WeoDataset, indices: &[usize]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for &i in indices {
        writer
            .serialize(ExportRow::from(&dataset.rows[i]))
            .with_context(|| format!("serializing row {i}"))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("flushing CSV writer: {err}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, year: i32, gdp: Option<f64>) -> Observation {
        Observation {
            country: country.to_string(),
            country_code: country.chars().take(3).collect::<String>().to_uppercase(),
            weo_year: year,
            exercise: 1,
            year,
            region: Some("Latin America".to_string()),
            income_group: None,
            forecast_gdp_growth: gdp,
            forecast_inflation: Some(3.2),
            forecast_current_account: None,
            realized_gdp_growth: None,
            realized_inflation: None,
            realized_current_account: None,
        }
    }

    #[test]
    fn writes_only_the_filtered_view() {
        let ds = WeoDataset::from_rows(vec![
            obs("Brazil", 2020, Some(-4.0)),
            obs("Chile", 2020, Some(-6.0)),
            obs("Brazil", 2021, Some(4.6)),
        ]);
        let csv_text = to_csv(&ds, &[0, 2]).expect("export");
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Country,CCode,weo_year,exercise,year,Region,incomegroup"));
        assert!(lines[1].starts_with("Brazil,BRA,2020,1,2020,Latin America,"));
        assert!(lines[2].starts_with("Brazil,BRA,2021,1,2021,Latin America,"));
        assert!(!csv_text.contains("Chile"));
    }

    #[test]
    fn missing_cells_serialize_as_empty_fields() {
        let ds = WeoDataset::from_rows(vec![obs("Brazil", 2020, None)]);
        let csv_text = to_csv(&ds, &[0]).expect("export");
        let data_line = csv_text.lines().nth(1).expect("data row");
        // incomegroup and Fngdp_rpc are both absent.
        assert!(data_line.contains("Latin America,,"));
    }

    #[test]
    fn empty_view_yields_headerless_empty_output() {
        let ds = WeoDataset::from_rows(vec![obs("Brazil", 2020, Some(-4.0))]);
        let csv_text = to_csv(&ds, &[]).expect("export");
        assert!(csv_text.is_empty());
    }
}
