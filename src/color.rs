use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Value;

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
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of the colour column to distinct colours.
/// Nulls always map to the default grey.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub field: String,
    mapping: BTreeMap<Value, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for `field` from its distinct values.
    pub fn new(field: &str, unique_values: &BTreeSet<Value>) -> Self {
        let categories: Vec<&Value> = unique_values.iter().filter(|v| !v.is_null()).collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            field: field.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn colors_are_stable_and_nulls_are_grey() {
        let values: BTreeSet<Value> =
            [Value::from("superficial"), Value::from("subterraneo"), Value::Null]
                .into_iter()
                .collect();
        let cm = ColorMap::new("tipo_de_anexo", &values);
        assert_eq!(cm.color_for(&Value::Null), Color32::GRAY);
        assert_eq!(cm.color_for(&Value::from("otro")), Color32::GRAY);
        assert_ne!(cm.color_for(&Value::from("superficial")), Color32::GRAY);
    }
}
