use eframe::egui;

use crate::state::AppState;
use crate::ui::{central, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WeoDashApp {
    pub state: AppState,
}

impl WeoDashApp {
    /// Load the configured dataset once at startup; failures land on the
    /// error screen instead of a partial dashboard.
    pub fn new() -> Self {
        let mut state = AppState::default();
        state.load_from_config();
        Self { state }
    }
}

impl eframe::App for WeoDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // A load failure is terminal for the session: show only the error.
        if let Some(error) = &self.state.fatal_error {
            let error = error.clone();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(egui::Color32::RED, error);
                });
            });
            return;
        }

        // ---- Top panel: status bar and export ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and data table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central::central_panel(ui, &mut self.state);
        });
    }
}
