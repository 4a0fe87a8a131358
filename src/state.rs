use crate::color::CarrierColors;
use crate::data::aggregate::{compute_info, parse_year};
use crate::data::model::{DelayBreakdown, FlightDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, read-only afterwards.
    dataset: FlightDataset,

    /// Raw contents of the year text box.
    pub year_input: String,

    /// Year the charts currently show.
    pub year: i32,

    /// Per-cause averages for `year`.
    pub breakdown: DelayBreakdown,

    /// Carrier colours, shared by all charts.
    pub colors: CarrierColors,

    /// Validation message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Take ownership of the dataset and compute the charts for `year`.
    pub fn new(dataset: FlightDataset, year: i32) -> Self {
        let colors = CarrierColors::new(dataset.carriers());
        let mut state = Self {
            dataset,
            year_input: year.to_string(),
            year,
            breakdown: DelayBreakdown::default(),
            colors,
            status_message: None,
        };
        state.show_year(year);
        state
    }

    pub fn dataset(&self) -> &FlightDataset {
        &self.dataset
    }

    /// Handle an edit of the year box.
    ///
    /// A valid year recomputes all five series; anything else leaves the
    /// current charts in place and sets `status_message`. Returns whether
    /// the charts were recomputed.
    pub fn apply_year_input(&mut self) -> bool {
        match parse_year(&self.year_input) {
            Ok(year) => {
                self.status_message = None;
                self.show_year(year);
                true
            }
            Err(e) => {
                log::warn!("Ignoring year input {:?}: {e}", self.year_input);
                self.status_message = Some(e.to_string());
                false
            }
        }
    }

    fn show_year(&mut self, year: i32) {
        self.year = year;
        self.breakdown = compute_info(&self.dataset, year);
        log::debug!(
            "Year {year}: {} aggregate rows across {} causes",
            self.breakdown.row_count(),
            self.breakdown.iter().filter(|s| !s.is_empty()).count()
        );
    }
}
