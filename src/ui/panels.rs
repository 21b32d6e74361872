use eframe::egui::{self, CollapsingHeader, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::columns::Column;
use crate::data::filter::CombinationMode;
use crate::data::predicate::{Choice, RangeMode};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No hay datos cargados.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            boundary_section(ui, state);
            ui.separator();
            categorical_section(ui, state);
            ui.separator();
            numeric_section(ui, state);
        });
}

fn boundary_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Filtrado por región vía GeoJSON");
    ui.label("Instrucciones: entra a https://geojson.io/ y dibuja un polígono.");
    ui.label("Después descarga el archivo como GeoJSON y cárgalo aquí.");
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Cargar GeoJSON…").clicked() {
            open_boundary_dialog(state);
        }
        if let Some(name) = state.boundary_name.clone() {
            ui.label(name);
            if ui.small_button("Quitar").clicked() {
                state.set_boundary(None);
            }
        }
    });
}

/// Combo box for a combination mode; returns whether it changed.
fn mode_selector(ui: &mut Ui, id: &str, mode: &mut CombinationMode) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(mode.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for option in [CombinationMode::Exclusive, CombinationMode::Inclusive] {
                changed |= ui
                    .selectable_value(mode, option, option.to_string())
                    .changed();
            }
        });
    changed
}

fn categorical_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Filtrar por valor");
    let mut mode = state.categorical_mode;
    if mode_selector(ui, "categorical_mode", &mut mode) {
        state.set_modes(mode, state.numeric_mode);
    }

    let registry: Vec<Column> = state
        .live
        .categorical
        .iter()
        .map(|f| Column::Categorical(*f))
        .collect();
    CollapsingHeader::new("Selecciona columnas para filtrar por valor")
        .id_salt("registry_columns")
        .show(ui, |ui: &mut Ui| column_checkboxes(ui, state, &registry));

    let other = state.live.other.clone();
    if !other.is_empty() {
        CollapsingHeader::new("Selecciona columnas para filtrar")
            .id_salt("other_columns")
            .show(ui, |ui: &mut Ui| column_checkboxes(ui, state, &other));
    }

    // ---- Value pickers for the chosen columns ----
    let active: Vec<Column> = state.categorical_selections.keys().cloned().collect();
    for column in &active {
        let domain = state.value_domain(column);
        let chosen = state
            .categorical_selections
            .get(column)
            .cloned()
            .unwrap_or_default();

        // Values shown exclude the sentinel from the count.
        let header_text = format!(
            "Valores para: {}  ({}/{})",
            column.label(),
            chosen.len(),
            domain.len().saturating_sub(1)
        );

        CollapsingHeader::new(RichText::new(header_text).strong())
            .id_salt(("values", column.field_id()))
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                ScrollArea::vertical()
                    .id_salt(("values_scroll", column.field_id()))
                    .max_height(220.0)
                    .show(ui, |ui: &mut Ui| {
                        for choice in &domain {
                            let mut text = RichText::new(choice.to_string());
                            // Show colour swatch if this is the colour column
                            if let (Choice::Value(v), Some(cm)) = (choice, &state.color_map) {
                                if cm.field == column.field_id() {
                                    text = text.color(cm.color_for(v));
                                }
                            }

                            let mut checked = chosen.contains(choice);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_choice(column, choice);
                            }
                        }
                    });
            });
    }
}

fn column_checkboxes(ui: &mut Ui, state: &mut AppState, columns: &[Column]) {
    for column in columns {
        let mut checked = state.categorical_selections.contains_key(column);
        if ui.checkbox(&mut checked, column.label().into_owned()).changed() {
            state.toggle_categorical_column(column);
        }
    }
}

fn numeric_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Filtrar por rango");
    let mut mode = state.numeric_mode;
    if mode_selector(ui, "numeric_mode", &mut mode) {
        state.set_modes(state.categorical_mode, mode);
    }

    let fields = state.live.numeric.clone();
    CollapsingHeader::new("Selecciona columnas para filtrar por rango")
        .id_salt("numeric_columns")
        .show(ui, |ui: &mut Ui| {
            for field in &fields {
                let mut checked = state.numeric_selections.contains_key(field);
                if ui.checkbox(&mut checked, field.label()).changed() {
                    state.toggle_numeric_column(*field);
                }
            }
        });

    // ---- Range pickers for the chosen columns ----
    let active: Vec<_> = state
        .numeric_selections
        .iter()
        .map(|(f, s)| (*f, *s))
        .collect();
    for (field, mut selection) in active {
        let Some(extent) = state.extent(field) else {
            continue;
        };
        ui.add_space(4.0);
        ui.label(RichText::new(format!("Escoge un rango para: {}", field.label())).strong());

        let mut changed = false;
        egui::ComboBox::from_id_salt(("range_mode", field.field_id()))
            .selected_text(selection.mode.label())
            .show_ui(ui, |ui: &mut Ui| {
                for mode in RangeMode::ALL {
                    changed |= ui
                        .selectable_value(&mut selection.mode, mode, mode.label())
                        .changed();
                }
            });

        if matches!(selection.mode, RangeMode::GreaterThan | RangeMode::Between) {
            changed |= ui
                .add(Slider::new(&mut selection.lower, extent.min..=extent.max).text("Valor mínimo"))
                .changed();
        }
        if matches!(selection.mode, RangeMode::LessThan | RangeMode::Between) {
            changed |= ui
                .add(Slider::new(&mut selection.upper, extent.min..=extent.max).text("Valor máximo"))
                .changed();
        }

        if changed {
            state.set_range(field, selection);
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Descargar datos…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.menu_button("Diagnóstico", |ui: &mut Ui| {
            ui.checkbox(
                &mut state.show_initial_diagnostics,
                "Mostrar diagnóstico de Datos iniciales",
            );
            ui.checkbox(
                &mut state.show_filtered_diagnostics,
                "Mostrar diagnóstico de Datos filtrados",
            );
        });

        ui.separator();

        if let (Some(ds), Some(filtered)) = (&state.dataset, &state.filtered) {
            ui.label(format!(
                "{}: {} registros cargados, {} visibles",
                state.dataset_name.as_deref().unwrap_or("datos"),
                ds.len(),
                filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir datos REPDA")
        .add_filter("Archivos compatibles", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_dataset(&path);
    }
}

fn open_boundary_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Cargar GeoJSON")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        state.load_boundary(&path);
    }
}

fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Descargar datos")
        .set_file_name("data.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_dataset(&path) {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
