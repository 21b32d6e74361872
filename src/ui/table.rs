use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::RecordTable;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Data table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the filtered records.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Datos");

    let Some(table) = &state.filtered else {
        ui.label("Sin datos.");
        return;
    };

    ScrollArea::horizontal()
        .id_salt("data_table_scroll")
        .show(ui, |ui: &mut Ui| records_table(ui, table));
}

fn records_table(ui: &mut Ui, table: &RecordTable) {
    let columns = table.column_names();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(
            TableColumn::auto().at_least(60.0).at_most(320.0).clip(true),
            columns.len(),
        )
        .header(20.0, |mut header| {
            for name in columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.len(), |mut row| {
                let record = &table.rows()[row.index()];
                for value in record.values() {
                    row.col(|ui| {
                        ui.label(value.to_cell());
                    });
                }
            });
        });
}
