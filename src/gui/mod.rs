//! GUI module - Interactive dashboard

mod app;
mod chart_viewer;
mod control_panel;

pub use app::DashboardApp;
pub use chart_viewer::{ChartViewer, DashboardView};
pub use control_panel::{ControlPanel, ControlPanelAction, FilterSettings};

use crate::config::AnalysisConfig;
use std::path::PathBuf;

/// Open the dashboard window, optionally loading `csv` on start.
pub fn run_dashboard(config: AnalysisConfig, csv: Option<PathBuf>) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Superstore Insights"),
        ..Default::default()
    };

    eframe::run_native(
        "Superstore Insights",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config, csv)))),
    )
}
