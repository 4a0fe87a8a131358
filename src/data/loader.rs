use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use thiserror::Error;

use super::model::{DelayCause, DelayRecord, FlightDataset, MetadataValue};

/// Identifier columns that are always kept as text, so `"007"` stays `"007"`.
pub const TEXT_COLUMNS: [&str; 4] = ["Div1Airport", "Div1TailNum", "Div2Airport", "Div2TailNum"];

const YEAR: &str = "Year";
const MONTH: &str = "Month";
const AIRLINE: &str = "Reporting_Airline";

/// Cell spellings treated as a missing delay.
const MISSING_MARKERS: [&str; 6] = ["", "NA", "NaN", "nan", "null", "NULL"];

/// The source table doesn't have the shape the dashboard needs.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: month {month} is outside 1..=12")]
    MonthOutOfRange { row: usize, month: i64 },
    #[error("column '{column}' of type {data_type} cannot be read as text")]
    NotText { column: String, data_type: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the flight-delay table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, ISO-8859-1 text (the export format of the source data)
/// * `.parquet` – the same columns in a Parquet file
pub fn load_file(path: &Path) -> Result<FlightDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (dataset, dropped) = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} from {} (dropped index columns: {:?})",
        dataset.summary(),
        path.display(),
        dropped
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Where each needed column sits in the header.
#[derive(Debug)]
struct ColumnLayout {
    year: usize,
    month: usize,
    airline: usize,
    /// Indexed like [`DelayCause::ALL`].
    delays: [usize; 5],
    /// Everything else that isn't a dropped index column.
    attributes: Vec<(usize, String)>,
    /// Index columns left out of the records.
    dropped: Vec<String>,
}

/// Positional index columns left behind by a DataFrame export.
fn is_index_column(name: &str) -> bool {
    name.trim().is_empty() || name.starts_with("Unnamed: ") || name == "__index_level_0__"
}

impl ColumnLayout {
    fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(SchemaError::MissingColumn(name))
        };

        let year = find(YEAR)?;
        let month = find(MONTH)?;
        let airline = find(AIRLINE)?;
        let mut delays = [0; 5];
        for (slot, cause) in DelayCause::ALL.into_iter().enumerate() {
            delays[slot] = find(cause.column())?;
        }

        let mut attributes = Vec::new();
        let mut dropped = Vec::new();
        for (idx, name) in headers.iter().enumerate() {
            if is_index_column(name) {
                dropped.push(name.clone());
                continue;
            }
            if idx == year || idx == month || idx == airline || delays.contains(&idx) {
                continue;
            }
            attributes.push((idx, name.clone()));
        }

        Ok(ColumnLayout {
            year,
            month,
            airline,
            delays,
            attributes,
            dropped,
        })
    }
}

fn invalid(row: usize, column: &str, value: impl Into<String>) -> SchemaError {
    SchemaError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.into(),
    }
}

fn checked_year(row: usize, raw: i64) -> Result<i32, SchemaError> {
    i32::try_from(raw).map_err(|_| invalid(row, YEAR, raw.to_string()))
}

fn checked_month(row: usize, raw: i64) -> Result<u32, SchemaError> {
    u32::try_from(raw)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or(SchemaError::MonthOutOfRange { row, month: raw })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// A parsed table plus the index columns left out of it.
type Loaded = (FlightDataset, Vec<String>);

fn load_csv(path: &Path) -> Result<Loaded> {
    let bytes = std::fs::read(path).context("reading CSV file")?;
    parse_csv(&bytes)
}

/// Parse an ISO-8859-1 encoded CSV table.
pub fn load_csv_bytes(bytes: &[u8]) -> Result<FlightDataset> {
    parse_csv(bytes).map(|(dataset, _)| dataset)
}

fn parse_csv(bytes: &[u8]) -> Result<Loaded> {
    // Latin-1 maps every byte to the code point of the same value.
    let text = encoding_rs::mem::decode_latin1(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut records = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result.with_context(|| format!("CSV row {row}"))?;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let year = checked_year(row, parse_int(row, YEAR, cell(layout.year))?)?;
        let month = checked_month(row, parse_int(row, MONTH, cell(layout.month))?)?;

        let mut delays = [None; 5];
        for (slot, cause) in DelayCause::ALL.into_iter().enumerate() {
            delays[slot] = parse_delay(row, cause.column(), cell(layout.delays[slot]))?;
        }

        let attributes = layout
            .attributes
            .iter()
            .map(|(i, name)| (name.clone(), attribute_value(name, cell(*i))))
            .collect();

        records.push(build_record(
            year,
            month,
            cell(layout.airline).trim().to_string(),
            delays,
            attributes,
        ));
    }

    Ok((FlightDataset::from_records(records), layout.dropped))
}

fn build_record(
    year: i32,
    month: u32,
    reporting_airline: String,
    delays: [Option<f64>; 5],
    attributes: BTreeMap<String, MetadataValue>,
) -> DelayRecord {
    let [carrier_delay, weather_delay, nas_delay, security_delay, late_aircraft_delay] = delays;
    DelayRecord {
        year,
        month,
        reporting_airline,
        carrier_delay,
        weather_delay,
        nas_delay,
        security_delay,
        late_aircraft_delay,
        attributes,
    }
}

/// Integers, also accepting an integral float spelling such as `"3.0"`.
fn parse_int(row: usize, column: &str, s: &str) -> Result<i64, SchemaError> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(invalid(row, column, s)),
    }
}

fn parse_delay(row: usize, column: &str, s: &str) -> Result<Option<f64>, SchemaError> {
    let s = s.trim();
    if MISSING_MARKERS.contains(&s) {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| invalid(row, column, s))
}

fn attribute_value(column: &str, s: &str) -> MetadataValue {
    if TEXT_COLUMNS.contains(&column) {
        if s.is_empty() {
            MetadataValue::Null
        } else {
            MetadataValue::String(s.to_string())
        }
    } else {
        guess_metadata_type(s)
    }
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    if s.is_empty() {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    if s == "True" || s == "False" || s == "true" || s == "false" {
        return MetadataValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    MetadataValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load the table from Parquet. Column names match the CSV header;
/// `Year`/`Month` may be integer or integral float columns.
fn load_parquet(path: &Path) -> Result<Loaded> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    read_parquet(file)
}

/// Parse a Parquet table held in memory.
pub fn load_parquet_bytes(bytes: Bytes) -> Result<FlightDataset> {
    read_parquet(bytes).map(|(dataset, _)| dataset)
}

fn read_parquet<R: ChunkReader + 'static>(source: R) -> Result<Loaded> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(source).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut dropped = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let layout = ColumnLayout::resolve(&names)?;
        if dropped.is_empty() {
            dropped = layout.dropped.clone();
        }

        // Dictionary (categorical), view and numeric-code columns all become Utf8.
        let airline_col = batch.column(layout.airline);
        let airline_text = as_text_column(AIRLINE, airline_col)?;
        let mut text_attributes = BTreeMap::new();
        for (i, name) in &layout.attributes {
            if TEXT_COLUMNS.contains(&name.as_str()) {
                text_attributes.insert(*i, as_text_column(name, batch.column(*i))?);
            }
        }

        for batch_row in 0..batch.num_rows() {
            let row = records.len() + 1;

            let year_col = batch.column(layout.year);
            let year = int_cell(year_col, batch_row)
                .ok_or_else(|| invalid(row, YEAR, describe_cell(year_col, batch_row)))?;
            let month_col = batch.column(layout.month);
            let month = int_cell(month_col, batch_row)
                .ok_or_else(|| invalid(row, MONTH, describe_cell(month_col, batch_row)))?;

            let mut delays = [None; 5];
            for (slot, cause) in DelayCause::ALL.into_iter().enumerate() {
                let col = batch.column(layout.delays[slot]);
                delays[slot] = float_cell(col, batch_row)
                    .map_err(|_| invalid(row, cause.column(), describe_cell(col, batch_row)))?;
            }

            let airline = match text_cell(&airline_text, batch_row) {
                Some(code) => code,
                None if airline_col.is_null(batch_row) => String::new(),
                // The cast nulls out cells it can't convert.
                None => return Err(invalid(row, AIRLINE, describe_cell(airline_col, batch_row)).into()),
            };

            let attributes = layout
                .attributes
                .iter()
                .map(|(i, name)| {
                    let value = match text_attributes.get(i) {
                        Some(text) => text_cell(text, batch_row)
                            .map(MetadataValue::String)
                            .unwrap_or(MetadataValue::Null),
                        None => extract_metadata_value(batch.column(*i), batch_row),
                    };
                    (name.clone(), value)
                })
                .collect();

            records.push(build_record(
                checked_year(row, year)?,
                checked_month(row, month)?,
                airline.trim().to_string(),
                delays,
                attributes,
            ));
        }
    }

    Ok((FlightDataset::from_records(records), dropped))
}

// -- Parquet / Arrow helpers --

/// Cast a column to Utf8, failing for types with no text form.
fn as_text_column(column: &str, col: &ArrayRef) -> Result<ArrayRef, SchemaError> {
    cast(col, &DataType::Utf8).map_err(|_| SchemaError::NotText {
        column: column.to_string(),
        data_type: col.data_type().to_string(),
    })
}

fn int_cell(col: &ArrayRef, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| i64::from(a.value(row))),
        DataType::Int64 => col.as_primitive_opt::<Int64Type>().map(|a| a.value(row)),
        DataType::Float32 | DataType::Float64 => float_cell(col, row)
            .ok()
            .flatten()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64),
        DataType::Utf8 | DataType::LargeUtf8 => text_cell(col, row)?.trim().parse().ok(),
        _ => None,
    }
}

/// `Ok(None)` for a null cell, `Err` for a column that isn't numeric.
fn float_cell(col: &ArrayRef, row: usize) -> Result<Option<f64>, ()> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| a.value(row)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| f64::from(a.value(row))),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| f64::from(a.value(row))),
        // A column of nothing but nulls may come through untyped.
        DataType::Null => return Ok(None),
        _ => None,
    };
    value.map(|v| (!v.is_nan()).then_some(v)).ok_or(())
}

fn text_cell(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|a| a.value(row).to_string()),
        _ => None,
    }
}

fn describe_cell(col: &ArrayRef, row: usize) -> String {
    extract_metadata_value(col, row).to_string()
}

/// Extract a single attribute value from an Arrow column at a given row.
fn extract_metadata_value(col: &ArrayRef, row: usize) -> MetadataValue {
    if col.is_null(row) {
        return MetadataValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => text_cell(col, row)
            .map(MetadataValue::String)
            .unwrap_or(MetadataValue::Null),
        DataType::Int32 | DataType::Int64 => int_cell(col, row)
            .map(MetadataValue::Integer)
            .unwrap_or(MetadataValue::Null),
        DataType::Float32 | DataType::Float64 => match float_cell(col, row) {
            Ok(Some(f)) => MetadataValue::Float(f),
            _ => MetadataValue::Null,
        },
        DataType::Boolean => col
            .as_boolean_opt()
            .map(|a| MetadataValue::Bool(a.value(row)))
            .unwrap_or(MetadataValue::Null),
        _ => array_value_to_string(col, row)
            .map(MetadataValue::String)
            .unwrap_or(MetadataValue::Null),
    }
}
