use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every field has a default, so an absent or partial
/// `dashboard.json` is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Flight-delay table to load (`.csv` or `.parquet`).
    pub data_path: PathBuf,
    /// Year shown before the user types anything.
    pub default_year: i32,
    /// Initial window size in points.
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("airline_data.csv"),
            default_year: 2010,
            window_size: [1400.0, 1000.0],
        }
    }
}

impl DashboardConfig {
    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// A first positional argument replaces `data_path`.
    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        if let Some(path) = args.into_iter().next() {
            self.data_path = path.into();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = DashboardConfig::from_json(r#"{ "default_year": 2012 }"#).unwrap();
        assert_eq!(cfg.default_year, 2012);
        assert_eq!(cfg.data_path, PathBuf::from("airline_data.csv"));
        assert_eq!(cfg.window_size, [1400.0, 1000.0]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(DashboardConfig::from_json(r#"{ "default_year": "soon" }"#).is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let cfg = DashboardConfig::load(Path::new("no/such/dashboard.json")).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn positional_argument_overrides_data_path() {
        let cfg = DashboardConfig::default().with_args(vec!["other.parquet"]);
        assert_eq!(cfg.data_path, PathBuf::from("other.parquet"));
        let cfg = DashboardConfig::default().with_args(Vec::<String>::new());
        assert_eq!(cfg.data_path, PathBuf::from("airline_data.csv"));
    }
}
