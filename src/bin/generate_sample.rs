use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alviridi_dashboard::data::model::columns;
use alviridi_dashboard::export::save_dataset_csv;
use alviridi_dashboard::{Dataset, Record};
use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 120;

const COMPANIES: [&str; 6] = [
    "Alviridi Capital",
    "Terra Ventures",
    "Blue Horizon Partners",
    "Sahel Growth",
    "Andes Impact",
    "Mekong Green",
];
const FUNDS: [&str; 5] = [
    "Climate Fund I",
    "Climate Fund II",
    "Water Access Fund",
    "Agri Resilience Fund",
    "Clean Energy Fund",
];
const THEMES: [&str; 6] = [
    "Renewable Energy",
    "Sustainable Agriculture",
    "Water & Sanitation",
    "Financial Inclusion",
    "Green Buildings",
    "Clean Transport",
];
/// `(country, is in the Global South)`.
const COUNTRIES: [(&str, bool); 10] = [
    ("Kenya", true),
    ("India", true),
    ("Brazil", true),
    ("Nigeria", true),
    ("Vietnam", true),
    ("Peru", true),
    ("Germany", false),
    ("United States", false),
    ("United Kingdom", false),
    ("Japan", false),
];

/// Minimal deterministic PRNG (xorshift64*).
struct SampleRng(u64);

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.unit()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sample_records(rows: usize, rng: &mut SampleRng) -> Vec<Record> {
    (0..rows)
        .map(|_| {
            let &(country, global_south) = rng.pick(&COUNTRIES);
            let fund_size = round2(rng.range(50.0, 500.0));
            let investment = round2(fund_size * rng.range(0.2, 1.1));
            let scope1 = round2(rng.range(100.0, 5_000.0));
            let scope2 = round2(rng.range(100.0, 3_000.0));
            let scope3 = round2(rng.range(500.0, 12_000.0));

            Record {
                company: rng.pick(&COMPANIES).to_string(),
                country: country.to_string(),
                fund: rng.pick(&FUNDS).to_string(),
                theme: rng.pick(&THEMES).to_string(),
                fund_size_musd: fund_size,
                investment_musd: investment,
                total_capital_committed_busd: round2(rng.range(0.5, 5.0)),
                fund_investments: rng.range(1.0, 40.0) as i64,
                country_capital_catalyzed_musd: round2(investment * rng.range(0.5, 3.0)),
                theme_capital_catalyzed_musd: round2(investment * rng.range(0.3, 2.5)),
                total_emissions_tco2e: round2(scope1 + scope2 + scope3),
                scope1_emissions_tco2e: scope1,
                scope2_emissions_tco2e: scope2,
                scope3_emissions_tco2e: scope3,
                global_south_countries_supported: global_south.then(|| country.to_string()),
                global_south_deals_funded: if global_south {
                    rng.range(1.0, 15.0) as i64
                } else {
                    0
                },
            }
        })
        .collect()
}

/// Column-per-field record batch with the loader's column names.
fn to_record_batch(records: &[Record]) -> Result<RecordBatch> {
    let text = |get: fn(&Record) -> &str| -> ArrayRef {
        let mut builder = StringBuilder::new();
        for r in records {
            builder.append_value(get(r));
        }
        Arc::new(builder.finish())
    };
    let float = |get: fn(&Record) -> f64| -> ArrayRef {
        let mut builder = Float64Builder::new();
        for r in records {
            builder.append_value(get(r));
        }
        Arc::new(builder.finish())
    };
    let int = |get: fn(&Record) -> i64| -> ArrayRef {
        let mut builder = Int64Builder::new();
        for r in records {
            builder.append_value(get(r));
        }
        Arc::new(builder.finish())
    };

    let mut gs_builder = StringBuilder::new();
    for r in records {
        gs_builder.append_option(r.global_south_countries_supported.as_deref());
    }

    let arrays: Vec<ArrayRef> = vec![
        text(|r| r.company.as_str()),
        text(|r| r.country.as_str()),
        text(|r| r.fund.as_str()),
        text(|r| r.theme.as_str()),
        float(|r| r.fund_size_musd),
        float(|r| r.investment_musd),
        float(|r| r.total_capital_committed_busd),
        int(|r| r.fund_investments),
        float(|r| r.country_capital_catalyzed_musd),
        float(|r| r.theme_capital_catalyzed_musd),
        float(|r| r.total_emissions_tco2e),
        float(|r| r.scope1_emissions_tco2e),
        float(|r| r.scope2_emissions_tco2e),
        float(|r| r.scope3_emissions_tco2e),
        Arc::new(gs_builder.finish()),
        int(|r| r.global_south_deals_funded),
    ];

    let fields: Vec<Field> = columns::REQUIRED
        .iter()
        .zip(&arrays)
        .map(|(name, array)| {
            let nullable = *name == columns::GLOBAL_SOUTH_COUNTRIES;
            Field::new(*name, array.data_type().clone(), nullable)
        })
        .collect();

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("Failed to create RecordBatch")
}

fn write_parquet(records: &[Record], path: &Path) -> Result<()> {
    let batch = to_record_batch(records)?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .context("Failed to create parquet writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SampleRng::new(42);
    let records = sample_records(ROWS, &mut rng);

    let parquet_path = out_dir.join("dummy_sample.parquet");
    write_parquet(&records, &parquet_path)?;

    let csv_path = out_dir.join("dummy_sample.csv");
    save_dataset_csv(&Dataset::from_records(records), &csv_path)?;

    println!(
        "Wrote {ROWS} fund rows to {} and {}",
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alviridi_dashboard::data::loader::read_parquet;

    #[test]
    fn generator_is_deterministic() {
        let a = sample_records(20, &mut SampleRng::new(7));
        let b = sample_records(20, &mut SampleRng::new(7));
        assert_eq!(a, b);
    }

    #[test]
    fn global_south_deals_only_for_global_south_rows() {
        let records = sample_records(200, &mut SampleRng::new(1));
        for r in &records {
            if r.global_south_countries_supported.is_none() {
                assert_eq!(r.global_south_deals_funded, 0);
            }
        }
        assert!(records.iter().any(|r| r.global_south_countries_supported.is_some()));
    }

    #[test]
    fn parquet_output_loads_back() {
        let records = sample_records(15, &mut SampleRng::new(3));
        let path = std::env::temp_dir().join("alviridi_generate_sample_test.parquet");
        write_parquet(&records, &path).unwrap();

        let loaded = read_parquet(File::open(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, Dataset::from_records(records));
    }
}
