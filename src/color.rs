use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: country/aggregate name → Color32
// ---------------------------------------------------------------------------

/// Maps the selected country names to distinct, stable colours so a country
/// keeps its colour across the line and scatter charts.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map over a sorted iterator of country names.
    pub fn new<'a>(countries: impl IntoIterator<Item = &'a String>) -> Self {
        let names: Vec<&String> = countries.into_iter().collect();
        let palette = generate_palette(names.len());
        ColorMap {
            mapping: names
                .into_iter()
                .zip(palette)
                .map(|(name, color)| (name.clone(), color))
                .collect(),
        }
    }

    /// Look up the colour for a country; unknown names fall back to gray.
    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping.get(country).copied().unwrap_or(Color32::GRAY)
    }
}
