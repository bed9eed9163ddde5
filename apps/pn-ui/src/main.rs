#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![allow(clippy::collapsible_if)]

mod app;
mod submit_worker;
mod views;

use app::PhaseNavApp;
use pn_app::Settings;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SETTINGS_FILE: &str = "phasenav.yaml";

fn main() -> eframe::Result<()> {
    let settings = match Settings::load(Some(Path::new(SETTINGS_FILE))) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}; using default settings");
            Settings::default()
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_title("PhaseNavigator"),
        ..Default::default()
    };

    eframe::run_native(
        "PhaseNavigator",
        options,
        Box::new(|cc| Ok(Box::new(PhaseNavApp::new(cc, settings)?))),
    )
}
