mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::WeoDashApp;
use eframe::egui;

fn main() -> eframe::Result {
    dotenv::dotenv().ok();
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "WEO Dash – IMF Macroeconomic Forecasts",
        options,
        Box::new(|_cc| Ok(Box::new(WeoDashApp::new()))),
    )
}
