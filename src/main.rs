use std::path::Path;

use anyhow::Result;
use eframe::egui;

use flight_delay_dashboard::app::DashboardApp;
use flight_delay_dashboard::config::{CONFIG_FILE, DashboardConfig};
use flight_delay_dashboard::data::loader;
use flight_delay_dashboard::state::AppState;
use flight_delay_dashboard::ui::panels::TITLE;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load(Path::new(CONFIG_FILE))?
        .with_args(std::env::args_os().skip(1));

    // Nothing is served against a partial dataset: a load failure ends here.
    let dataset = loader::load_file(&config.data_path).inspect_err(|e| {
        log::error!("Failed to load {}: {e:#}", config.data_path.display());
    })?;
    let state = AppState::new(dataset, config.default_year);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
