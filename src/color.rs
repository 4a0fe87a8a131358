use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.5);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Carrier → colour
// ---------------------------------------------------------------------------

/// One colour per carrier, shared by every chart so a carrier's line looks
/// the same everywhere.
#[derive(Debug, Clone, Default)]
pub struct CarrierColors {
    mapping: BTreeMap<String, Color32>,
}

impl CarrierColors {
    pub fn new(carriers: &BTreeSet<String>) -> Self {
        let mapping = carriers
            .iter()
            .cloned()
            .zip(generate_palette(carriers.len()))
            .collect();
        CarrierColors { mapping }
    }

    /// Colour for `carrier`; grey for codes the dataset never mentioned.
    pub fn color_for(&self, carrier: &str) -> Color32 {
        self.mapping.get(carrier).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        let unique: BTreeSet<_> = colors.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn carriers_get_stable_colours() {
        let carriers: BTreeSet<String> = ["AA", "DL", "UA"].iter().map(|s| s.to_string()).collect();
        let a = CarrierColors::new(&carriers);
        let b = CarrierColors::new(&carriers);
        assert_eq!(a.color_for("DL"), b.color_for("DL"));
        assert_ne!(a.color_for("AA"), a.color_for("UA"));
        assert_eq!(a.color_for("ZZ"), Color32::GRAY);
    }
}
