/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  airline_data.csv (ISO-8859-1) / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode + parse file → FlightDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ FlightDataset  │  Vec<DelayRecord>, years, carriers (read-only)
///   └───────────────┘
///        │  year
///        ▼
///   ┌───────────┐
///   │ aggregate  │  filter by year → mean per (month, carrier) per cause
///   └───────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
