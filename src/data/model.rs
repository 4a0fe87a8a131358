use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// MetadataValue – a single cell in a column the dashboard doesn't chart
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// DelayCause – the five delay measurements
// ---------------------------------------------------------------------------

/// One of the five responsible factors a delay is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DelayCause {
    Carrier,
    Weather,
    Nas,
    Security,
    LateAircraft,
}

impl DelayCause {
    /// All causes in chart order.
    pub const ALL: [DelayCause; 5] = [
        DelayCause::Carrier,
        DelayCause::Weather,
        DelayCause::Nas,
        DelayCause::Security,
        DelayCause::LateAircraft,
    ];

    /// Source column holding this cause's minutes.
    pub fn column(self) -> &'static str {
        match self {
            DelayCause::Carrier => "CarrierDelay",
            DelayCause::Weather => "WeatherDelay",
            DelayCause::Nas => "NASDelay",
            DelayCause::Security => "SecurityDelay",
            DelayCause::LateAircraft => "LateAircraftDelay",
        }
    }

    /// Chart title.
    pub fn title(self) -> &'static str {
        match self {
            DelayCause::Carrier => "Average Carrier Delay (minutes)",
            DelayCause::Weather => "Average Weather Delay (minutes)",
            DelayCause::Nas => "Average NAS Delay (minutes)",
            DelayCause::Security => "Average Security Delay (minutes)",
            DelayCause::LateAircraft => "Average Late Aircraft Delay (minutes)",
        }
    }

    /// Stable identifier, used for widget ids.
    pub fn key(self) -> &'static str {
        match self {
            DelayCause::Carrier => "carrier",
            DelayCause::Weather => "weather",
            DelayCause::Nas => "nas",
            DelayCause::Security => "security",
            DelayCause::LateAircraft => "late_aircraft",
        }
    }
}

// ---------------------------------------------------------------------------
// DelayRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single flight record.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayRecord {
    pub year: i32,
    /// Calendar month, 1..=12.
    pub month: u32,
    /// Carrier code; empty when the source cell was blank.
    pub reporting_airline: String,
    pub carrier_delay: Option<f64>,
    pub weather_delay: Option<f64>,
    pub nas_delay: Option<f64>,
    pub security_delay: Option<f64>,
    pub late_aircraft_delay: Option<f64>,
    /// Every other column: column_name → value.
    pub attributes: BTreeMap<String, MetadataValue>,
}

impl DelayRecord {
    /// Minutes recorded for `cause`, `None` when missing.
    pub fn delay(&self, cause: DelayCause) -> Option<f64> {
        match cause {
            DelayCause::Carrier => self.carrier_delay,
            DelayCause::Weather => self.weather_delay,
            DelayCause::Nas => self.nas_delay,
            DelayCause::Security => self.security_delay,
            DelayCause::LateAircraft => self.late_aircraft_delay,
        }
    }

    pub fn attribute(&self, column: &str) -> Option<&MetadataValue> {
        self.attributes.get(column)
    }
}

// ---------------------------------------------------------------------------
// FlightDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Built once, never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FlightDataset {
    records: Vec<DelayRecord>,
    /// Sorted distinct years present.
    years: BTreeSet<i32>,
    /// Sorted distinct non-empty carrier codes.
    carriers: BTreeSet<String>,
}

impl FlightDataset {
    /// Build the year / carrier indices from the loaded records.
    pub fn from_records(records: Vec<DelayRecord>) -> Self {
        let years = records.iter().map(|r| r.year).collect();
        let carriers = records
            .iter()
            .filter(|r| !r.reporting_airline.is_empty())
            .map(|r| r.reporting_airline.clone())
            .collect();
        FlightDataset {
            records,
            years,
            carriers,
        }
    }

    pub fn records(&self) -> &[DelayRecord] {
        &self.records
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn carriers(&self) -> &BTreeSet<String> {
        &self.carriers
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One-line description for the header, e.g. `"1200 records, years 2008–2012, 5 carriers"`.
    pub fn summary(&self) -> String {
        match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) => format!(
                "{} records, years {first}–{last}, {} carriers",
                self.len(),
                self.carriers.len()
            ),
            _ => "0 records".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation output
// ---------------------------------------------------------------------------

/// Mean delay of one cause for one (month, carrier) group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub month: u32,
    pub reporting_airline: String,
    pub mean_delay: f64,
}

/// All groups for one cause, ordered by month then carrier.
#[derive(Debug, Clone, PartialEq)]
pub struct DelaySeries {
    pub cause: DelayCause,
    pub rows: Vec<AggregateRow>,
}

impl DelaySeries {
    pub fn empty(cause: DelayCause) -> Self {
        DelaySeries {
            cause,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split the rows into one `[month, mean]` polyline per carrier.
    pub fn lines_by_airline(&self) -> BTreeMap<&str, Vec<[f64; 2]>> {
        let mut lines: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
        for row in &self.rows {
            lines
                .entry(row.reporting_airline.as_str())
                .or_default()
                .push([f64::from(row.month), row.mean_delay]);
        }
        lines
    }
}

/// The five per-cause series produced for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayBreakdown {
    pub carrier: DelaySeries,
    pub weather: DelaySeries,
    pub nas: DelaySeries,
    pub security: DelaySeries,
    pub late_aircraft: DelaySeries,
}

impl Default for DelayBreakdown {
    fn default() -> Self {
        Self {
            carrier: DelaySeries::empty(DelayCause::Carrier),
            weather: DelaySeries::empty(DelayCause::Weather),
            nas: DelaySeries::empty(DelayCause::Nas),
            security: DelaySeries::empty(DelayCause::Security),
            late_aircraft: DelaySeries::empty(DelayCause::LateAircraft),
        }
    }
}

impl DelayBreakdown {
    pub fn series(&self, cause: DelayCause) -> &DelaySeries {
        match cause {
            DelayCause::Carrier => &self.carrier,
            DelayCause::Weather => &self.weather,
            DelayCause::Nas => &self.nas,
            DelayCause::Security => &self.security,
            DelayCause::LateAircraft => &self.late_aircraft,
        }
    }

    pub fn series_mut(&mut self, cause: DelayCause) -> &mut DelaySeries {
        match cause {
            DelayCause::Carrier => &mut self.carrier,
            DelayCause::Weather => &mut self.weather,
            DelayCause::Nas => &mut self.nas,
            DelayCause::Security => &mut self.security,
            DelayCause::LateAircraft => &mut self.late_aircraft,
        }
    }

    /// Series in chart order.
    pub fn iter(&self) -> impl Iterator<Item = &DelaySeries> {
        DelayCause::ALL.into_iter().map(move |cause| self.series(cause))
    }

    /// Total rows across all five series.
    pub fn row_count(&self) -> usize {
        self.iter().map(|s| s.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(DelaySeries::is_empty)
    }
}
