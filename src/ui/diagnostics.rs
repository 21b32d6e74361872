use eframe::egui::{self, Grid, ScrollArea, Ui};

use crate::data::diagnostics::TableSummary;
use crate::data::model::RecordTable;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Diagnostics windows
// ---------------------------------------------------------------------------

/// Show the optional "describe" windows for the initial and filtered data.
pub fn windows(ctx: &egui::Context, state: &mut AppState) {
    if let Some(summary) = &state.initial_summary {
        egui::Window::new("Diagnóstico de Datos iniciales")
            .open(&mut state.show_initial_diagnostics)
            .default_width(520.0)
            .show(ctx, |ui: &mut Ui| summary_ui(ui, "initial", summary));
    }

    if let Some(summary) = &state.filtered_summary {
        egui::Window::new("Diagnóstico de Datos filtrados")
            .open(&mut state.show_filtered_diagnostics)
            .default_width(520.0)
            .show(ctx, |ui: &mut Ui| summary_ui(ui, "filtered", summary));
    }
}

fn summary_ui(ui: &mut Ui, id: &str, summary: &TableSummary) {
    ScrollArea::both()
        .id_salt(("diagnostics", id))
        .show(ui, |ui: &mut Ui| {
            ui.label(format!("Filas: {}", summary.rows));
            ui.label(format!("Columnas: {}", summary.columns.len()));

            ui.collapsing("Tipos de datos", |ui: &mut Ui| {
                Grid::new(("dtypes", id)).striped(true).show(ui, |ui: &mut Ui| {
                    ui.strong("Columna");
                    ui.strong("Tipo");
                    ui.strong("No nulos");
                    ui.end_row();
                    for col in &summary.columns {
                        ui.label(&col.name);
                        ui.label(col.kind.to_string());
                        ui.label(col.non_null.to_string());
                        ui.end_row();
                    }
                });
            });

            ui.collapsing("Descripción", |ui: &mut Ui| {
                Grid::new(("describe", id)).striped(true).show(ui, |ui: &mut Ui| {
                    for header in ["Columna", "count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for col in &summary.columns {
                        let Some(s) = &col.stats else {
                            continue;
                        };
                        ui.label(&col.name);
                        ui.label(s.count.to_string());
                        for v in [s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.max] {
                            ui.label(format!("{v:.4}"));
                        }
                        ui.end_row();
                    }
                });
            });

            ui.collapsing("Head (5)", |ui: &mut Ui| preview_grid(ui, ("head", id), &summary.head));
            ui.collapsing("Tail (5)", |ui: &mut Ui| preview_grid(ui, ("tail", id), &summary.tail));
        });
}

fn preview_grid(ui: &mut Ui, id: (&str, &str), table: &RecordTable) {
    Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        for name in table.column_names() {
            ui.strong(name);
        }
        ui.end_row();
        for row in table.rows() {
            for value in row.values() {
                ui.label(value.to_cell());
            }
            ui.end_row();
        }
    });
}
