use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{diagnostics, map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RepdaExplorerApp {
    pub state: AppState,
}

impl RepdaExplorerApp {
    /// Build the app and load the startup dataset, if it exists.
    pub fn new(config: DashboardConfig) -> Self {
        let data_path = config.data_path.clone();
        let mut state = AppState::new(config);
        if data_path.exists() {
            state.load_dataset(&data_path);
        } else {
            log::info!(
                "Startup dataset {} not found; waiting for File → Abrir",
                data_path.display()
            );
        }
        Self { state }
    }
}

impl eframe::App for RepdaExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: data table ----
        egui::TopBottomPanel::bottom("data_panel")
            .resizable(true)
            .default_height(320.0)
            .show(ctx, |ui| {
                table::data_table(ui, &self.state);
            });

        // ---- Central panel: map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::registry_map(ui, &self.state);
        });

        // ---- Floating diagnostics windows ----
        diagnostics::windows(ctx, &mut self.state);
    }
}
