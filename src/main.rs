use eframe::egui;
use labtrend::app::LabTrendApp;
use labtrend::config::Profile;
use labtrend::data::loader;
use labtrend::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::with_profile(Profile::from_env());
    // Optional file to open on start-up.
    if let Some(path) = std::env::args_os().nth(1) {
        match loader::load_file(std::path::Path::new(&path)) {
            Ok(rows) => state.set_rows(rows),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.to_string_lossy());
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "LabTrend – Batch Trend & CV Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(LabTrendApp::new(state)))),
    )
}
