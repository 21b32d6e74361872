use std::path::PathBuf;

use crate::data::columns::CategoricalField;

/// Environment variable naming the dataset loaded at startup.
pub const DATA_PATH_ENV: &str = "REPDA_DATA";
const DEFAULT_DATA_PATH: &str = "data.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Static settings of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Dataset loaded when the app starts.
    pub data_path: PathBuf,
    /// Column that colours the map markers.
    pub color_field: CategoricalField,
    /// Headline of the hover tooltip.
    pub hover_name: CategoricalField,
    /// Extra lines of the hover tooltip.
    pub hover_fields: Vec<CategoricalField>,
    /// Initial map centre as `[lon, lat]`.
    pub map_center: [f64; 2],
    /// Half-width in degrees of the initial map view.
    pub map_span: f64,
    pub marker_radius: f32,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            color_field: CategoricalField::TipoDeAnexo,
            hover_name: CategoricalField::Titular,
            hover_fields: vec![
                CategoricalField::Titulo,
                CategoricalField::Estado,
                CategoricalField::Municipio,
                CategoricalField::RegionHidrologica,
                CategoricalField::Cuenca,
                CategoricalField::Acuifero,
            ],
            map_center: [-102.552784, 23.634501],
            map_span: 16.0,
            marker_radius: 3.0,
            window_size: [1400.0, 900.0],
        }
    }
}

impl DashboardConfig {
    /// Defaults, with the startup dataset overridden by `REPDA_DATA`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(DATA_PATH_ENV).filter(|p| !p.is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        config
    }
}
