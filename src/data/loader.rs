use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DataLoadError, LoadResult};
use super::model::{columns, Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a fund dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row carrying every required column
/// * `.json`    – `[{ "Company Name": "...", "Fund Size ($M)": 120.0, ... }, ...]`
/// * `.parquet` – one Arrow column per required column (text or numeric)
pub fn load_file(path: &Path) -> LoadResult<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let open = || {
        File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let dataset = match ext.as_str() {
        "csv" => read_csv(BufReader::new(open()?))?,
        "json" => read_json(BufReader::new(open()?))?,
        "parquet" | "pq" => read_parquet(open()?)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!("Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cell decoding shared by all formats
// ---------------------------------------------------------------------------

/// One raw cell before it is typed into a [`Record`] field.
#[derive(Debug, Clone)]
enum Cell<'a> {
    Empty,
    Text(Cow<'a, str>),
    Number(f64),
}

/// The cells of one input row, laid out in [`columns::REQUIRED`] order.
struct RowCells<'a> {
    /// 1-based data row number for error messages.
    row: usize,
    cells: Vec<Cell<'a>>,
}

impl<'a> RowCells<'a> {
    /// `None` when the column has no cell in this row.
    fn cell(&self, column: &str) -> Option<&Cell<'a>> {
        columns::REQUIRED
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.cells.get(i))
    }

    fn optional_text(&self, column: &str) -> Option<String> {
        match self.cell(column)? {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Number(v) => Some(v.to_string()),
        }
    }

    fn text(&self, column: &str) -> String {
        self.optional_text(column).unwrap_or_default()
    }

    /// Float column; empty cells, nulls and NaN count as zero. Infinities
    /// are rejected.
    fn amount(&self, column: &str) -> LoadResult<f64> {
        let value = match self.cell(column) {
            None | Some(Cell::Empty) => return Ok(0.0),
            Some(Cell::Number(v)) => *v,
            Some(Cell::Text(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(0.0);
                }
                s.parse::<f64>().map_err(|_| self.invalid(column, s))?
            }
        };
        if value.is_nan() {
            Ok(0.0)
        } else if value.is_infinite() {
            Err(self.invalid(column, &value.to_string()))
        } else {
            Ok(value)
        }
    }

    /// Integer column; accepts integral float text such as `"12.0"`.
    fn count(&self, column: &str) -> LoadResult<i64> {
        let value = self.amount(column)?;
        if value.fract() != 0.0 {
            return Err(self.invalid(column, &value.to_string()));
        }
        Ok(value as i64)
    }

    fn invalid(&self, column: &str, value: &str) -> DataLoadError {
        DataLoadError::InvalidValue {
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    fn into_record(self) -> LoadResult<Record> {
        Ok(Record {
            company: self.text(columns::COMPANY),
            country: self.text(columns::COUNTRY),
            fund: self.text(columns::FUND),
            theme: self.text(columns::THEME),
            fund_size_musd: self.amount(columns::FUND_SIZE)?,
            investment_musd: self.amount(columns::INVESTMENT)?,
            total_capital_committed_busd: self.amount(columns::CAPITAL_COMMITTED)?,
            fund_investments: self.count(columns::FUND_INVESTMENTS)?,
            country_capital_catalyzed_musd: self.amount(columns::COUNTRY_CAPITAL)?,
            theme_capital_catalyzed_musd: self.amount(columns::THEME_CAPITAL)?,
            total_emissions_tco2e: self.amount(columns::TOTAL_EMISSIONS)?,
            scope1_emissions_tco2e: self.amount(columns::SCOPE1_EMISSIONS)?,
            scope2_emissions_tco2e: self.amount(columns::SCOPE2_EMISSIONS)?,
            scope3_emissions_tco2e: self.amount(columns::SCOPE3_EMISSIONS)?,
            global_south_countries_supported: self.optional_text(columns::GLOBAL_SOUTH_COUNTRIES),
            global_south_deals_funded: self.count(columns::GLOBAL_SOUTH_DEALS)?,
        })
    }
}

/// Map every required column to its position among `headers`, or report
/// all the ones that are missing at once.
fn locate_columns(headers: &[&str]) -> LoadResult<Vec<usize>> {
    let mut positions = Vec::with_capacity(columns::REQUIRED.len());
    let mut missing = Vec::new();

    for required in columns::REQUIRED {
        match headers.iter().position(|h| h.trim() == required) {
            Some(pos) => positions.push(pos),
            None => missing.push(required.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(DataLoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the required column names (extra columns are
/// ignored), one record per line.
pub fn read_csv<R: Read>(input: R) -> LoadResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let positions = locate_columns(&names)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        let cells = positions
            .iter()
            .map(|&pos| match row.get(pos) {
                Some(s) if !s.is_empty() => Cell::Text(Cow::Borrowed(s)),
                _ => Cell::Empty,
            })
            .collect();

        records.push(RowCells { row: i + 1, cells }.into_record()?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Company Name": "Acme", "Country": "Kenya", "Fund Size ($M)": 120.0, ... },
///   ...
/// ]
/// ```
///
/// A key absent from one object is treated as an empty cell; a key absent
/// from every object is a missing column.
pub fn read_json<R: Read>(input: R) -> LoadResult<Dataset> {
    let root: JsonValue = serde_json::from_reader(input)?;
    let rows = root
        .as_array()
        .ok_or_else(|| DataLoadError::Malformed("expected a top-level JSON array".into()))?;

    let objects = rows
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_object()
                .ok_or_else(|| DataLoadError::Malformed(format!("row {} is not a JSON object", i + 1)))
        })
        .collect::<LoadResult<Vec<_>>>()?;

    if objects.is_empty() {
        return Ok(Dataset::default());
    }

    let keys: Vec<&str> = objects
        .iter()
        .flat_map(|obj| obj.keys().map(String::as_str))
        .collect();
    locate_columns(&keys)?;

    let mut records = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        let cells = columns::REQUIRED
            .iter()
            .map(|column| json_cell(obj.get(*column)))
            .collect();
        records.push(RowCells { row: i + 1, cells }.into_record()?);
    }

    Ok(Dataset::from_records(records))
}

fn json_cell(value: Option<&JsonValue>) -> Cell<'_> {
    match value {
        None | Some(JsonValue::Null) => Cell::Empty,
        Some(JsonValue::String(s)) => Cell::Text(Cow::Borrowed(s)),
        Some(JsonValue::Number(n)) => n.as_f64().map_or(Cell::Empty, Cell::Number),
        Some(other) => Cell::Text(Cow::Owned(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
///
/// Text columns may be Utf8 or LargeUtf8; numeric columns any of
/// Int32/Int64/Float32/Float64. Nulls behave like empty CSV cells.
pub fn read_parquet(file: File) -> LoadResult<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let positions = {
        let names: Vec<&str> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        locate_columns(&names)?
    };
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let arrays: Vec<&ArrayRef> = positions.iter().map(|&pos| batch.column(pos)).collect();

        for row in 0..batch.num_rows() {
            let cells = arrays
                .iter()
                .map(|array| arrow_cell(array, row))
                .collect::<LoadResult<Vec<_>>>()?;
            let row_no = records.len() + 1;
            records.push(RowCells { row: row_no, cells }.into_record()?);
        }
    }

    Ok(Dataset::from_records(records))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(array: &ArrayRef, row: usize) -> LoadResult<Cell<'_>> {
    if array.is_null(row) {
        return Ok(Cell::Empty);
    }
    let cell = match array.data_type() {
        DataType::Utf8 => Cell::Text(Cow::Borrowed(array.as_string::<i32>().value(row))),
        DataType::LargeUtf8 => Cell::Text(Cow::Borrowed(array.as_string::<i64>().value(row))),
        DataType::Int32 => Cell::Number(array.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Cell::Number(array.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Float32 => Cell::Number(array.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Number(array.as_primitive::<Float64Type>().value(row)),
        _ => Cell::Text(Cow::Owned(arrow::util::display::array_value_to_string(array.as_ref(), row)?)),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Company Name,Country,Fund,Theme,Fund Size ($M),Investment ($M),\
Total Capital Committed ($B),Fund Investments,Country Capital Catalyzed ($M),\
Theme Capital Catalyzed ($M),Total Emissions by Fund (tons of CO2e),\
Scope 1 Emissions (tons of CO2e),Scope 2 Emissions (tons of CO2e),\
Scope 3 Emissions (tons of CO2e),Global South Countries Supported,Global South Deals Funded";

    #[test]
    fn csv_rows_become_records() {
        let text = format!(
            "{HEADER}\nAcme,Kenya,Fund I,Energy,100,40,1.5,12,30,20,500,100,150,250,Kenya,4\n"
        );
        let ds = read_csv(text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 1);
        let r = &ds.records()[0];
        assert_eq!(r.company, "Acme");
        assert_eq!(r.fund_size_musd, 100.0);
        assert_eq!(r.total_capital_committed_busd, 1.5);
        assert_eq!(r.fund_investments, 12);
        assert_eq!(r.global_south_countries_supported.as_deref(), Some("Kenya"));
        assert_eq!(r.global_south_deals_funded, 4);
    }

    #[test]
    fn empty_numeric_cells_default_to_zero() {
        let text = format!("{HEADER}\nAcme,Chile,Fund II,Water{}\n", ",".repeat(12));
        let ds = read_csv(text.as_bytes()).unwrap();
        let r = &ds.records()[0];

        assert_eq!(r.investment_musd, 0.0);
        assert_eq!(r.fund_investments, 0);
        assert_eq!(r.global_south_countries_supported, None);
    }

    #[test]
    fn integral_float_text_is_accepted_for_counts() {
        let text = format!("{HEADER}\nAcme,Chile,Fund II,Water,1,1,1,12.0,1,1,1,1,1,1,,3.0\n");
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].fund_investments, 12);
        assert_eq!(ds.records()[0].global_south_deals_funded, 3);
    }

    #[test]
    fn every_missing_column_is_reported() {
        let text = "Company Name,Country,Theme\nAcme,Kenya,Energy\n";
        match read_csv(text.as_bytes()) {
            Err(DataLoadError::MissingColumns(missing)) => {
                assert!(missing.contains(&"Fund".to_string()));
                assert!(missing.contains(&columns::GLOBAL_SOUTH_DEALS.to_string()));
                assert!(!missing.contains(&"Country".to_string()));
                assert_eq!(missing.len(), columns::REQUIRED.len() - 3);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn bad_number_names_row_and_column() {
        let text = format!(
            "{HEADER}\nAcme,Kenya,Fund I,Energy,100,40,1.5,12,30,20,500,100,150,250,Kenya,4\n\
Beta,Peru,Fund I,Energy,lots,40,1.5,12,30,20,500,100,150,250,,4\n"
        );
        match read_csv(text.as_bytes()) {
            Err(DataLoadError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, columns::FUND_SIZE);
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn nan_text_reads_as_missing() {
        let text = format!(
            "{HEADER}\nAcme,Kenya,Fund I,Energy,100,NaN,1.5,nan,30,20,500,100,150,250,Kenya,4\n"
        );
        let ds = read_csv(text.as_bytes()).unwrap();
        let r = &ds.records()[0];

        assert_eq!(r.investment_musd, 0.0);
        assert_eq!(r.fund_investments, 0);
        assert_eq!(r.fund_size_musd, 100.0);
    }

    #[test]
    fn infinite_text_is_rejected() {
        for spelling in ["inf", "-infinity", "Infinity"] {
            let text = format!(
                "{HEADER}\nAcme,Kenya,Fund I,Energy,100,40,1.5,12,30,20,{spelling},100,150,250,Kenya,4\n"
            );
            match read_csv(text.as_bytes()) {
                Err(DataLoadError::InvalidValue { row, column, .. }) => {
                    assert_eq!(row, 1);
                    assert_eq!(column, columns::TOTAL_EMISSIONS);
                }
                other => panic!("expected InvalidValue for {spelling}, got {other:?}"),
            }
        }
    }

    /// One-row Parquet file where every numeric column is Float64, holding
    /// `investment` and `emissions` in their columns and 1.0 elsewhere.
    fn float_parquet(name: &str, investment: f64, emissions: f64) -> File {
        use std::sync::Arc;

        use arrow::array::{Float64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let text_columns = [
            columns::COMPANY,
            columns::COUNTRY,
            columns::FUND,
            columns::THEME,
            columns::GLOBAL_SOUTH_COUNTRIES,
        ];
        let mut fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for column in columns::REQUIRED {
            if text_columns.contains(&column) {
                fields.push(Field::new(column, DataType::Utf8, false));
                arrays.push(Arc::new(StringArray::from(vec!["Kenya"])));
            } else {
                let value = match column {
                    columns::INVESTMENT => investment,
                    columns::TOTAL_EMISSIONS => emissions,
                    _ => 1.0,
                };
                fields.push(Field::new(column, DataType::Float64, false));
                arrays.push(Arc::new(Float64Array::from(vec![value])));
            }
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap();

        let path = std::env::temp_dir().join(name);
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        let file = File::open(&path).unwrap();
        std::fs::remove_file(&path).ok();
        file
    }

    #[test]
    fn parquet_nan_reads_as_missing() {
        let ds = read_parquet(float_parquet("alviridi_loader_nan.parquet", f64::NAN, 5.0)).unwrap();
        let r = &ds.records()[0];
        assert_eq!(r.investment_musd, 0.0);
        assert_eq!(r.total_emissions_tco2e, 5.0);
        assert_eq!(r.fund_investments, 1);
    }

    #[test]
    fn parquet_infinity_is_rejected() {
        let file = float_parquet("alviridi_loader_inf.parquet", 3.0, f64::INFINITY);
        assert!(matches!(
            read_parquet(file),
            Err(DataLoadError::InvalidValue { row: 1, column, .. }) if column == columns::TOTAL_EMISSIONS
        ));
    }

    #[test]
    fn header_only_csv_is_an_empty_dataset() {
        let ds = read_csv(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn json_records_accept_numbers_strings_and_nulls() {
        let text = r#"[
            {"Company Name": "Acme", "Country": "Kenya", "Fund": "Fund I", "Theme": "Energy",
             "Fund Size ($M)": 100, "Investment ($M)": "40", "Total Capital Committed ($B)": 1.5,
             "Fund Investments": 12, "Country Capital Catalyzed ($M)": null,
             "Theme Capital Catalyzed ($M)": 20, "Total Emissions by Fund (tons of CO2e)": 500,
             "Scope 1 Emissions (tons of CO2e)": 100, "Scope 2 Emissions (tons of CO2e)": 150,
             "Scope 3 Emissions (tons of CO2e)": 250, "Global South Countries Supported": null,
             "Global South Deals Funded": 4}
        ]"#;
        let ds = read_json(text.as_bytes()).unwrap();
        let r = &ds.records()[0];

        assert_eq!(r.investment_musd, 40.0);
        assert_eq!(r.country_capital_catalyzed_musd, 0.0);
        assert_eq!(r.global_south_countries_supported, None);
        assert_eq!(r.fund_investments, 12);
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(matches!(
            read_json(r#"{"Company Name": "Acme"}"#.as_bytes()),
            Err(DataLoadError::Malformed(_))
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(matches!(
            load_file(Path::new("funds.xlsx")),
            Err(DataLoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_file(Path::new("/nonexistent/dir/funds.csv")),
            Err(DataLoadError::Io { .. })
        ));
    }
}
