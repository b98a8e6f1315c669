use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (name, code, region, income group, trend GDP growth, trend inflation).
/// Aggregates carry no region or income group, matching the real dataset.
const COUNTRIES: [(&str, &str, Option<&str>, Option<&str>, f64, f64); 8] = [
    ("Brazil", "BRA", Some("Latin America & Caribbean"), Some("Upper middle income"), 2.0, 6.0),
    ("Chile", "CHL", Some("Latin America & Caribbean"), Some("High income"), 3.5, 4.0),
    ("United States", "USA", Some("North America"), Some("High income"), 2.5, 2.5),
    ("Germany", "DEU", Some("Europe & Central Asia"), Some("High income"), 1.5, 1.8),
    ("India", "IND", Some("South Asia"), Some("Lower middle income"), 6.0, 7.0),
    ("Zimbabwe", "ZWE", Some("Sub-Saharan Africa"), Some("Lower middle income"), 1.0, 40.0),
    ("World", "WLD", None, None, 3.0, 4.0),
    ("Euro area", "EA", None, None, 1.8, 2.0),
];

const FIRST_YEAR: i64 = 1990;
const LAST_YEAR: i64 = 2024;

#[derive(Default)]
struct Columns {
    country: Vec<String>,
    code: Vec<String>,
    weo_year: Vec<i64>,
    exercise: Vec<i64>,
    year: Vec<i64>,
    region: Vec<Option<String>>,
    income_group: Vec<Option<String>>,
    f_gdp: Vec<Option<f64>>,
    f_inf: Vec<Option<f64>>,
    f_bca: Vec<Option<f64>>,
    r_gdp: Vec<Option<f64>>,
    r_inf: Vec<Option<f64>>,
    r_bca: Vec<Option<f64>>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for (name, code, region, income, trend_gdp, trend_inf) in COUNTRIES {
        for year in FIRST_YEAR..=LAST_YEAR {
            let forecast_gdp = rng.gauss(trend_gdp, 1.5);
            let forecast_inf = rng.gauss(trend_inf, trend_inf * 0.3);
            let forecast_bca = rng.gauss(-1.0, 2.0);

            // Zimbabwe's 2007-2008 hyperinflation: raw values far past the
            // ±100% cap, so the loader's clamp is visible in the sample.
            let (forecast_inf, realized_inf) = if name == "Zimbabwe" && (2007..=2008).contains(&year)
            {
                (forecast_inf + 500.0, Some(forecast_inf * 1000.0))
            } else {
                (forecast_inf, Some(forecast_inf + rng.gauss(0.0, 1.0)))
            };

            // Realized values lag one WEO vintage and are missing for the
            // most recent years, like the real panel.
            let realized_known = year <= LAST_YEAR - 2;
            let some_if_known = |v: f64| realized_known.then_some(v);

            cols.country.push(name.to_string());
            cols.code.push(code.to_string());
            cols.weo_year.push(year);
            cols.exercise.push(if rng.next_f64() < 0.5 { 1 } else { 2 });
            cols.year.push(year);
            cols.region.push(region.map(str::to_string));
            cols.income_group.push(income.map(str::to_string));
            cols.f_gdp.push(Some(forecast_gdp));
            cols.f_inf.push(Some(forecast_inf));
            cols.f_bca.push(Some(forecast_bca));
            cols.r_gdp.push(some_if_known(forecast_gdp + rng.gauss(0.0, 1.0)));
            cols.r_inf.push(realized_inf.and_then(|v| some_if_known(v)));
            cols.r_bca.push(some_if_known(forecast_bca + rng.gauss(0.0, 0.5)));
        }
    }

    cols
}

fn write_parquet(cols: &Columns, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Country", DataType::Utf8, false),
        Field::new("CCode", DataType::Utf8, false),
        Field::new("weo_year", DataType::Int64, false),
        Field::new("exercise", DataType::Int64, false),
        Field::new("year", DataType::Int64, false),
        Field::new("Region", DataType::Utf8, true),
        Field::new("incomegroup", DataType::Utf8, true),
        Field::new("Fngdp_rpc", DataType::Float64, true),
        Field::new("pcpi_pch", DataType::Float64, true),
        Field::new("bca_gdp", DataType::Float64, true),
        Field::new("Rngdp_rpc", DataType::Float64, true),
        Field::new("Rpcpi_pch", DataType::Float64, true),
        Field::new("Rbca_gdp", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(StringArray::from(cols.country.clone())),
            Arc::new(StringArray::from(cols.code.clone())),
            Arc::new(Int64Array::from(cols.weo_year.clone())),
            Arc::new(Int64Array::from(cols.exercise.clone())),
            Arc::new(Int64Array::from(cols.year.clone())),
            Arc::new(StringArray::from(cols.region.clone())),
            Arc::new(StringArray::from(cols.income_group.clone())),
            Arc::new(Float64Array::from(cols.f_gdp.clone())),
            Arc::new(Float64Array::from(cols.f_inf.clone())),
            Arc::new(Float64Array::from(cols.f_bca.clone())),
            Arc::new(Float64Array::from(cols.r_gdp.clone())),
            Arc::new(Float64Array::from(cols.r_inf.clone())),
            Arc::new(Float64Array::from(cols.r_bca.clone())),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(cols: &Columns, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Country", "CCode", "weo_year", "exercise", "year", "Region", "incomegroup",
        "Fngdp_rpc", "pcpi_pch", "bca_gdp", "Rngdp_rpc", "Rpcpi_pch", "Rbca_gdp",
    ])?;

    let float_cell = |v: &Option<f64>| v.map(|v| format!("{v:.4}")).unwrap_or_default();
    for i in 0..cols.country.len() {
        writer.write_record([
            cols.country[i].clone(),
            cols.code[i].clone(),
            cols.weo_year[i].to_string(),
            cols.exercise[i].to_string(),
            cols.year[i].to_string(),
            cols.region[i].clone().unwrap_or_default(),
            cols.income_group[i].clone().unwrap_or_default(),
            float_cell(&cols.f_gdp[i]),
            float_cell(&cols.f_inf[i]),
            float_cell(&cols.f_bca[i]),
            float_cell(&cols.r_gdp[i]),
            float_cell(&cols.r_inf[i]),
            float_cell(&cols.r_bca[i]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    write_parquet(&cols, "sample_weo.parquet")?;
    write_csv(&cols, "sample_weo.csv")?;

    println!(
        "Wrote {} observations to sample_weo.parquet and sample_weo.csv",
        cols.country.len()
    );
    println!("Point DATA_PATH at either file to explore it in the dashboard.");
    Ok(())
}
