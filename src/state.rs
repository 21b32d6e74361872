use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::columns::{Column, NumericField};
use crate::data::diagnostics::TableSummary;
use crate::data::filter::{self, CombinationMode, FilterError};
use crate::data::liveness::LiveColumns;
use crate::data::model::{Extent, RecordTable};
use crate::data::predicate::{
    build_categorical_set, build_numeric_set, value_domain, Choice, RangeSelection,
};
use crate::data::spatial::{self, Boundary};
use crate::data::{export, loader};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Only widget selections live here; filter sets are rebuilt from them on
/// every pass and applied to the unfiltered table.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded). Never mutated.
    pub dataset: Option<RecordTable>,
    pub dataset_name: Option<String>,

    /// Optional spatial mask and the file it came from.
    pub boundary: Option<Boundary>,
    pub boundary_name: Option<String>,

    /// Dataset restricted to the boundary (the whole dataset without one).
    pub masked: Option<RecordTable>,

    /// Columns offered as filters for `masked`.
    pub live: LiveColumns,

    /// Categorical columns chosen for filtering → chosen values.
    pub categorical_selections: BTreeMap<Column, Vec<Choice>>,
    pub categorical_mode: CombinationMode,

    /// Numeric columns chosen for filtering → slider state.
    pub numeric_selections: BTreeMap<NumericField, RangeSelection>,
    pub numeric_mode: CombinationMode,

    /// Result of the last successful filter pass.
    pub filtered: Option<RecordTable>,

    /// Describe tables for the diagnostics windows, refreshed with the data.
    pub initial_summary: Option<TableSummary>,
    pub filtered_summary: Option<TableSummary>,

    /// Colour map of the marker colour column.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub show_initial_diagnostics: bool,
    pub show_filtered_diagnostics: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            dataset_name: None,
            boundary: None,
            boundary_name: None,
            masked: None,
            live: LiveColumns::default(),
            categorical_selections: BTreeMap::new(),
            categorical_mode: CombinationMode::default(),
            numeric_selections: BTreeMap::new(),
            numeric_mode: CombinationMode::default(),
            filtered: None,
            initial_summary: None,
            filtered_summary: None,
            color_map: None,
            status_message: None,
            show_initial_diagnostics: false,
            show_filtered_diagnostics: false,
        }
    }

    /// Load a dataset file, reporting failures in the status line.
    pub fn load_dataset(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records with columns {:?}",
                    dataset.len(),
                    dataset.column_names()
                );
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_dataset(dataset, name);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, reset selections and colour.
    pub fn set_dataset(&mut self, dataset: RecordTable, name: String) {
        let color_field = self.config.color_field.field_id();
        self.color_map = dataset
            .unique_values(color_field)
            .map(|vals| ColorMap::new(color_field, &vals));

        self.categorical_selections.clear();
        self.numeric_selections.clear();
        self.initial_summary = Some(TableSummary::describe(&dataset));
        self.dataset = Some(dataset);
        self.dataset_name = Some(name);
        self.status_message = None;
        self.apply_mask();
    }

    /// Read a GeoJSON file and use it as the spatial mask.
    pub fn load_boundary(&mut self, path: &Path) {
        let result = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|text| Boundary::from_geojson(&text).context("parsing GeoJSON"));
        match result {
            Ok(boundary) => {
                log::info!(
                    "Loaded boundary with {} polygon(s) from {}",
                    boundary.polygons().len(),
                    path.display()
                );
                self.boundary_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                self.set_boundary(Some(boundary));
            }
            Err(e) => {
                log::error!("Failed to load boundary: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn set_boundary(&mut self, boundary: Option<Boundary>) {
        if boundary.is_none() {
            self.boundary_name = None;
        }
        self.boundary = boundary;
        self.apply_mask();
    }

    /// Recompute the masked table and live columns, then refilter.
    fn apply_mask(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let masked = match &self.boundary {
            Some(b) => spatial::within(dataset, b),
            None => dataset.clone(),
        };
        self.live = LiveColumns::classify(&masked);

        // Selections for columns that are no longer offered would only fail.
        let live = &self.live;
        self.categorical_selections.retain(|c, _| live.is_live(c));
        self.numeric_selections
            .retain(|f, _| live.is_live(&Column::Numeric(*f)));

        self.masked = Some(masked);
        self.refilter();
    }

    /// Re-run the filter pipeline after a selection change.
    ///
    /// On failure the previous view is kept and the error is shown; the
    /// dataset itself is never touched.
    pub fn refilter(&mut self) {
        let Some(masked) = &self.masked else {
            return;
        };
        match self.run_filters(masked) {
            Ok(filtered) => {
                log::info!("Filter pass: {} of {} records", filtered.len(), masked.len());
                self.filtered_summary = Some(TableSummary::describe(&filtered));
                self.filtered = Some(filtered);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Filter pass failed: {e}");
                self.status_message = Some(format!("Error en filtro: {e}"));
            }
        }
    }

    fn run_filters(&self, masked: &RecordTable) -> Result<RecordTable, FilterError> {
        let categorical = build_categorical_set(
            self.categorical_mode,
            self.categorical_selections
                .iter()
                .map(|(c, choices)| (c, choices.as_slice())),
        );
        let numeric = build_numeric_set(masked, self.numeric_mode, &self.numeric_selections)?;
        log::debug!(
            "categorical set: {} spec(s) {:?}; numeric set: {} spec(s) {:?}",
            categorical.len(),
            categorical.mode(),
            numeric.len(),
            numeric.mode()
        );
        let by_category = filter::apply(masked, &categorical)?;
        filter::apply(&by_category, &numeric)
    }

    // -- Selection helpers used by the side panel --

    /// Choices offered for a categorical column.
    pub fn value_domain(&self, column: &Column) -> Vec<Choice> {
        self.masked
            .as_ref()
            .and_then(|t| value_domain(t, column).ok())
            .unwrap_or_default()
    }

    /// Extent of a numeric column within the masked table.
    pub fn extent(&self, field: NumericField) -> Option<Extent> {
        self.masked.as_ref()?.extent(field.field_id())
    }

    /// Start or stop filtering on a categorical column.
    pub fn toggle_categorical_column(&mut self, column: &Column) {
        if self.categorical_selections.remove(column).is_none() {
            self.categorical_selections.insert(column.clone(), Vec::new());
        }
        self.refilter();
    }

    /// Toggle one value of a categorical column's selection.
    pub fn toggle_choice(&mut self, column: &Column, choice: &Choice) {
        let chosen = self.categorical_selections.entry(column.clone()).or_default();
        if let Some(pos) = chosen.iter().position(|c| c == choice) {
            chosen.remove(pos);
        } else {
            chosen.push(choice.clone());
        }
        self.refilter();
    }

    /// Start or stop filtering on a numeric column, seeding the sliders at
    /// the column extrema.
    pub fn toggle_numeric_column(&mut self, field: NumericField) {
        if self.numeric_selections.remove(&field).is_none() {
            if let Some(extent) = self.extent(field) {
                self.numeric_selections
                    .insert(field, RangeSelection::seeded(extent));
            }
        }
        self.refilter();
    }

    pub fn set_range(&mut self, field: NumericField, selection: RangeSelection) {
        self.numeric_selections.insert(field, selection);
        self.refilter();
    }

    pub fn set_modes(&mut self, categorical: CombinationMode, numeric: CombinationMode) {
        self.categorical_mode = categorical;
        self.numeric_mode = numeric;
        self.refilter();
    }

    /// Export the complete, unfiltered dataset.
    pub fn export_dataset(&self, path: &Path) -> Result<()> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        export::save_csv(dataset, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::CategoricalField;
    use crate::data::model::tests::table;
    use crate::data::model::Value;
    use crate::data::predicate::RangeMode;
    use eframe::egui::Color32;

    fn registry() -> RecordTable {
        table(&[
            &[
                ("municipio", Value::from("A")),
                ("tipo_de_anexo", Value::from("superficial")),
                ("volumen", Value::from(10)),
                ("lat", Value::from(1.0)),
                ("lon", Value::from(1.0)),
            ],
            &[
                ("municipio", Value::from("B")),
                ("tipo_de_anexo", Value::from("subterraneo")),
                ("volumen", Value::from(20)),
                ("lat", Value::from(2.0)),
                ("lon", Value::from(2.0)),
            ],
            &[
                ("municipio", Value::from("A")),
                ("tipo_de_anexo", Value::from("subterraneo")),
                ("volumen", Value::from(30)),
                ("lat", Value::from(8.0)),
                ("lon", Value::from(8.0)),
            ],
        ])
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(registry(), "registry".into());
        state
    }

    fn volumes(state: &AppState) -> Vec<Value> {
        state
            .filtered
            .as_ref()
            .expect("filtered")
            .column("volumen")
            .expect("volumen")
            .cloned()
            .collect()
    }

    #[test]
    fn categorical_then_numeric_pipeline() {
        let mut state = loaded();
        let municipio = Column::Categorical(CategoricalField::Municipio);
        state.toggle_categorical_column(&municipio);
        assert_eq!(volumes(&state).len(), 3);

        state.toggle_choice(&municipio, &Choice::Value(Value::from("A")));
        assert_eq!(volumes(&state), vec![Value::from(10), Value::from(30)]);

        state.toggle_numeric_column(NumericField::Volumen);
        state.set_range(
            NumericField::Volumen,
            RangeSelection {
                mode: RangeMode::GreaterThan,
                lower: 15.0,
                upper: 30.0,
            },
        );
        assert_eq!(volumes(&state), vec![Value::from(30)]);
        assert_eq!(state.dataset.as_ref().expect("dataset").len(), 3);
    }

    #[test]
    fn failed_pass_keeps_previous_view() {
        let mut state = loaded();
        state.set_range(
            NumericField::Volumen,
            RangeSelection {
                mode: RangeMode::Between,
                lower: 25.0,
                upper: 12.0,
            },
        );
        assert!(state.status_message.is_some());
        assert_eq!(volumes(&state).len(), 3);
    }

    #[test]
    fn boundary_masks_before_filters() {
        let mut state = loaded();
        let boundary = Boundary::from_geojson(
            r#"{"type": "Polygon", "coordinates": [[[0, 0], [5, 0], [5, 5], [0, 5], [0, 0]]]}"#,
        )
        .expect("boundary");
        state.set_boundary(Some(boundary));
        assert_eq!(volumes(&state), vec![Value::from(10), Value::from(20)]);
        assert_eq!(state.extent(NumericField::Volumen), Some(Extent { min: 10.0, max: 20.0 }));

        state.set_boundary(None);
        assert_eq!(volumes(&state).len(), 3);
    }

    #[test]
    fn inclusive_mode_unions_categorical_filters() {
        let mut state = loaded();
        let municipio = Column::Categorical(CategoricalField::Municipio);
        let tipo = Column::Categorical(CategoricalField::TipoDeAnexo);
        state.toggle_choice(&municipio, &Choice::Value(Value::from("B")));
        state.toggle_choice(&tipo, &Choice::Value(Value::from("superficial")));
        assert!(volumes(&state).is_empty());

        state.set_modes(CombinationMode::Inclusive, CombinationMode::Exclusive);
        assert_eq!(volumes(&state), vec![Value::from(10), Value::from(20)]);
    }

    #[test]
    fn summaries_follow_the_dataset_and_filter_pass() {
        let mut state = loaded();
        let rows = |s: &Option<TableSummary>| s.as_ref().map(|s| s.rows);
        assert_eq!(rows(&state.initial_summary), Some(3));
        assert_eq!(rows(&state.filtered_summary), Some(3));

        state.toggle_choice(
            &Column::Categorical(CategoricalField::Municipio),
            &Choice::Value(Value::from("A")),
        );
        assert_eq!(rows(&state.initial_summary), Some(3));
        assert_eq!(rows(&state.filtered_summary), Some(2));
    }

    #[test]
    fn color_map_covers_anexo_types() {
        let state = loaded();
        let cm = state.color_map.as_ref().expect("color map");
        assert_eq!(cm.field, "tipo_de_anexo");
        assert_ne!(cm.color_for(&Value::from("superficial")), Color32::GRAY);
    }

    #[test]
    fn export_writes_the_full_dataset() {
        let mut state = loaded();
        state.toggle_choice(
            &Column::Categorical(CategoricalField::Municipio),
            &Choice::Value(Value::from("B")),
        );
        assert_eq!(volumes(&state).len(), 1);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        state.export_dataset(&path).expect("export");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text.lines().count(), 4);
    }
}
