use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::config::DashboardConfig;
use crate::data::model::{RecordTable, Value};
use crate::state::AppState;

/// Hover labels only snap to records closer than this, in degrees.
const HOVER_RADIUS: f64 = 0.25;

// ---------------------------------------------------------------------------
// Registry map (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered records as a lon/lat scatter coloured by the
/// configured colour column.
pub fn registry_map(ui: &mut Ui, state: &AppState) {
    let table = match &state.filtered {
        Some(t) => t,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Abre un archivo para ver el mapa  (Archivo → Abrir…)");
            });
            return;
        }
    };

    let config = &state.config;
    let color_field = config.color_field.field_id();

    // One series per colour value so the legend lists the categories.
    let mut groups: BTreeMap<Value, Vec<[f64; 2]>> = BTreeMap::new();
    for row in 0..table.len() {
        let Some(point) = table.point(row) else {
            continue;
        };
        let category = table.value(row, color_field).cloned().unwrap_or(Value::Null);
        groups.entry(category).or_default().push(point);
    }

    let [cx, cy] = config.map_center;
    let span = config.map_span;
    let lookup = table.clone();
    let hover_config = config.clone();

    Plot::new("registry_map")
        .legend(Legend::default())
        .data_aspect(1.0)
        .x_axis_label("Longitud")
        .y_axis_label("Latitud")
        .include_x(cx - span)
        .include_x(cx + span)
        .include_y(cy - span / 2.0)
        .include_y(cy + span / 2.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |_name, pointer| hover_label(&lookup, &hover_config, pointer))
        .show(ui, |plot_ui| {
            for (category, points) in groups {
                let color = state
                    .color_map
                    .as_ref()
                    .map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(&category));
                let name = if category.is_null() {
                    "<sin valor>".to_string()
                } else {
                    category.to_string()
                };

                let series = Points::new(PlotPoints::from(points))
                    .name(name)
                    .color(color)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(config.marker_radius);

                plot_ui.points(series);
            }
        });
}

/// Tooltip for the record nearest the pointer, or the bare coordinates.
fn hover_label(table: &RecordTable, config: &DashboardConfig, pointer: &PlotPoint) -> String {
    let nearest = (0..table.len())
        .filter_map(|row| {
            let [lon, lat] = table.point(row)?;
            let d = (lon - pointer.x).hypot(lat - pointer.y);
            Some((row, d))
        })
        .filter(|(_, d)| *d <= HOVER_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let Some((row, _)) = nearest else {
        return format!("lon {:.4}\nlat {:.4}", pointer.x, pointer.y);
    };

    let cell = |field: &str| {
        table
            .value(row, field)
            .map(Value::to_cell)
            .unwrap_or_default()
    };
    let mut lines = vec![cell(config.hover_name.field_id())];
    for field in &config.hover_fields {
        lines.push(format!("{}: {}", field.label(), cell(field.field_id())));
    }
    lines.push(format!("{}: {}", config.color_field.label(), cell(config.color_field.field_id())));
    lines.join("\n")
}
