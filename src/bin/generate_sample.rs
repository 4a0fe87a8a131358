//! Writes a synthetic `airline_data.csv` (or `.parquet`) shaped like the
//! real on-time performance export, so the dashboard runs without it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use flight_delay_dashboard::data::model::DelayCause;

const YEARS: std::ops::RangeInclusive<i64> = 2008..=2012;
const FLIGHTS_PER_GROUP: usize = 20;
const CARRIERS: [&str; 6] = ["AA", "AS", "B6", "DL", "UA", "WN"];
const AIRPORTS: [(&str, &str); 8] = [
    ("ATL", "Atlanta, GA"),
    ("BQN", "Aguadilla, PR"),
    ("DFW", "Dallas/Fort Worth, TX"),
    ("JFK", "New York, NY"),
    ("MAZ", "Mayagüez, PR"),
    ("ORD", "Chicago, IL"),
    ("SEA", "Seattle, WA"),
    ("SJU", "San Juan, PR"),
];
/// Typical minutes per cause, indexed like `DelayCause::ALL`.
const MEAN_MINUTES: [f64; 5] = [18.0, 4.0, 14.0, 0.3, 22.0];

/// splitmix64; deterministic so repeated runs write the same file.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Exponentially distributed whole minutes.
    fn minutes(&mut self, mean: f64) -> f64 {
        (-mean * (1.0 - self.unit()).ln()).round()
    }
}

struct FlightRow {
    year: i64,
    month: i64,
    day: i64,
    carrier: &'static str,
    origin: (&'static str, &'static str),
    dest: &'static str,
    div1_airport: Option<&'static str>,
    div1_tail_num: Option<String>,
    delays: [Option<f64>; 5],
}

fn generate(rng: &mut SampleRng) -> Vec<FlightRow> {
    let mut rows = Vec::new();
    for year in YEARS {
        for month in 1..=12 {
            // Winter months run a little worse.
            let season = if matches!(month, 1 | 2 | 12) { 1.5 } else { 1.0 };
            for carrier in CARRIERS {
                for _ in 0..FLIGHTS_PER_GROUP {
                    let origin = AIRPORTS[rng.below(AIRPORTS.len())];
                    let dest = AIRPORTS[rng.below(AIRPORTS.len())].0;
                    let diverted = rng.chance(0.03);

                    let mut delays = [None; 5];
                    for (slot, mean) in MEAN_MINUTES.iter().enumerate() {
                        if !rng.chance(0.1) {
                            delays[slot] = Some(rng.minutes(mean * season));
                        }
                    }

                    rows.push(FlightRow {
                        year,
                        month,
                        day: 1 + rng.below(28) as i64,
                        carrier,
                        origin,
                        dest,
                        div1_airport: diverted.then(|| AIRPORTS[rng.below(AIRPORTS.len())].0),
                        div1_tail_num: diverted.then(|| format!("{:03}", rng.below(1000))),
                        delays,
                    });
                }
            }
        }
    }
    rows
}

fn header() -> Vec<&'static str> {
    let mut columns = vec![
        "",
        "Year",
        "Month",
        "DayofMonth",
        "Reporting_Airline",
        "Origin",
        "OriginCityName",
        "Dest",
        "Div1Airport",
        "Div1TailNum",
        "Div2Airport",
        "Div2TailNum",
    ];
    columns.extend(DelayCause::ALL.map(DelayCause::column));
    columns
}

/// CSV in ISO-8859-1, with the leading unnamed index column a DataFrame export leaves.
fn write_csv(rows: &[FlightRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header())?;

    for (index, row) in rows.iter().enumerate() {
        let mut record = vec![
            index.to_string(),
            row.year.to_string(),
            row.month.to_string(),
            row.day.to_string(),
            row.carrier.to_string(),
            row.origin.0.to_string(),
            row.origin.1.to_string(),
            row.dest.to_string(),
            row.div1_airport.unwrap_or_default().to_string(),
            row.div1_tail_num.clone().unwrap_or_default(),
            String::new(),
            String::new(),
        ];
        record.extend(
            row.delays
                .iter()
                .map(|d| d.map(|v| format!("{v:.1}")).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))?;
    let utf8 = String::from_utf8(bytes)?;
    let latin1 = encoding_rs::mem::encode_latin1_lossy(&utf8);
    std::fs::write(path, latin1).with_context(|| format!("writing {}", path.display()))
}

fn write_parquet(rows: &[FlightRow], path: &Path) -> Result<()> {
    let ints = |f: fn(&FlightRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let texts = |f: fn(&FlightRow) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("Year", DataType::Int64, false),
        Field::new("Month", DataType::Int64, false),
        Field::new("DayofMonth", DataType::Int64, false),
        Field::new("Reporting_Airline", DataType::Utf8, true),
        Field::new("Origin", DataType::Utf8, true),
        Field::new("OriginCityName", DataType::Utf8, true),
        Field::new("Dest", DataType::Utf8, true),
        Field::new("Div1Airport", DataType::Utf8, true),
        Field::new("Div1TailNum", DataType::Utf8, true),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        ints(|r| r.year),
        ints(|r| r.month),
        ints(|r| r.day),
        texts(|r| Some(r.carrier)),
        texts(|r| Some(r.origin.0)),
        texts(|r| Some(r.origin.1)),
        texts(|r| Some(r.dest)),
        texts(|r| r.div1_airport),
        texts(|r| r.div1_tail_num.as_deref()),
    ];
    for (slot, cause) in DelayCause::ALL.into_iter().enumerate() {
        fields.push(Field::new(cause.column(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.delays[slot]).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let output_path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("airline_data.csv"));

    let rows = generate(&mut SampleRng(42));

    let is_parquet = output_path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(&rows, &output_path)?;
    } else {
        write_csv(&rows, &output_path)?;
    }

    println!(
        "Wrote {} flights ({} carriers, years {}–{}) to {}",
        rows.len(),
        CARRIERS.len(),
        YEARS.start(),
        YEARS.end(),
        output_path.display()
    );
    Ok(())
}
