//! Superstore Dashboard Application
//! Main window with the filter panel and the dashboard viewer.

use crate::charts::StaticChartRenderer;
use crate::config::{AnalysisConfig, Palette};
use crate::data::export::export_file_name;
use crate::data::{
    write_filtered_csv, DataLoader, DataProcessor, EnrichedOrder, FilterDomain, LoadSummary,
};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::pipeline::Insights;
use crate::report::{executive_summary, write_report};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{error, info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Progress(f32, String),
    Complete {
        loader: DataLoader,
        orders: Vec<EnrichedOrder>,
        summary: LoadSummary,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: AnalysisConfig,
    palette: Palette,
    loader: DataLoader,
    orders: Vec<EnrichedOrder>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AnalysisConfig, initial_csv: Option<PathBuf>) -> Self {
        let mut app = Self {
            config,
            palette: Palette::default(),
            loader: DataLoader::new(),
            orders: Vec::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        if let Some(path) = initial_csv {
            app.start_loading(path);
        }
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    fn start_loading(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.orders.clear();
        self.control_panel.domain = None;
        self.control_panel.data_info.clear();
        self.control_panel.settings.csv_path = Some(path.clone());
        self.control_panel.set_progress(5.0, "Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || Self::run_load(tx, path));
    }

    /// Read, clean and enrich the file (called from background thread)
    fn run_load(tx: Sender<LoadResult>, path: PathBuf) {
        let _ = tx.send(LoadResult::Progress(10.0, "Reading CSV file...".to_string()));

        let mut loader = DataLoader::new();
        if let Err(e) = loader.load_csv(&path) {
            let _ = tx.send(LoadResult::Error(e.to_string()));
            return;
        }

        let _ = tx.send(LoadResult::Progress(40.0, "Cleaning orders...".to_string()));
        let cleaned = match loader.clean() {
            Ok(cleaned) => cleaned,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(LoadResult::Progress(70.0, "Deriving fields...".to_string()));
        match DataProcessor::derive_all(cleaned.orders) {
            Ok(orders) => {
                let _ = tx.send(LoadResult::Complete {
                    loader,
                    orders,
                    summary: cleaned.summary,
                });
            }
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
            }
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    LoadResult::Complete {
                        loader,
                        orders,
                        summary,
                    } => {
                        self.on_loaded(loader, orders, summary);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(e) => {
                        error!("Load failed: {e}");
                        self.control_panel.set_progress(0.0, &format!("Error: {e}"));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn on_loaded(&mut self, loader: DataLoader, orders: Vec<EnrichedOrder>, summary: LoadSummary) {
        let markets = loader.get_unique_values("market").len();
        self.control_panel.data_info = format!(
            "{} rows, {} kept, {} markets",
            loader.get_row_count(),
            summary.kept_rows,
            markets
        );
        self.loader = loader;
        self.orders = orders;

        match FilterDomain::from_orders(&self.orders) {
            Some(domain) => {
                self.control_panel.set_domain(domain);
                self.apply_filters();
                self.control_panel.set_progress(
                    100.0,
                    &format!(
                        "Complete! {} orders loaded ({} dropped for sales <= 0)",
                        summary.kept_rows, summary.dropped_non_positive_sales
                    ),
                );
            }
            None => {
                self.chart_viewer.clear();
                self.control_panel
                    .set_progress(0.0, "Error: no orders with positive sales");
            }
        }
    }

    /// Re-filter the loaded orders and recompute the dashboard.
    fn apply_filters(&mut self) {
        match self.control_panel.settings.to_filter() {
            Ok(filter) => {
                let filtered = filter.apply(&self.orders);
                let count = filtered.len();
                self.chart_viewer.set_orders(filtered, &self.config);
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! {count} of {} orders match", self.orders.len()),
                );
            }
            Err(message) => {
                warn!("Invalid filter: {message}");
                self.control_panel.set_progress(0.0, &format!("Error: {message}"));
            }
        }
    }

    fn handle_reset_filters(&mut self) {
        if let Some(domain) = &self.control_panel.domain {
            let domain = domain.clone();
            self.control_panel.settings.reset(&domain);
        }
        self.apply_filters();
    }

    /// Save the filtered rows in the input file's column layout.
    fn handle_export_csv(&mut self) {
        let Some(source) = self.loader.get_dataframe() else {
            self.control_panel.set_progress(0.0, "No data loaded");
            return;
        };
        let filtered = &self.chart_viewer.orders;
        if filtered.is_empty() {
            self.control_panel.set_progress(0.0, "No orders to export");
            return;
        }

        let file_name = match FilterDomain::from_orders(filtered) {
            Some(d) => export_file_name(d.first_date, d.last_date),
            None => "sales_filtered.csv".to_string(),
        };
        let mut dialog = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(file_name);
        if let Some(dir) = self.loader.get_file_path().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        match write_filtered_csv(source, filtered, &path) {
            Ok(rows) => self
                .control_panel
                .set_progress(100.0, &format!("Complete! Exported {rows} rows")),
            Err(e) => {
                error!("Export failed: {e}");
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
            }
        }
    }

    /// Write the static charts and the executive report for the filtered orders.
    fn handle_generate_report(&mut self) {
        let orders = &self.chart_viewer.orders;
        let insights = match Insights::compute(orders, &self.config) {
            Ok(insights) => insights,
            Err(e) => {
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
                return;
            }
        };

        self.control_panel.set_progress(30.0, "Rendering charts...");
        let out_dir = self.config.output_dir.clone();
        let renderer = StaticChartRenderer::new(&self.config, &self.palette, &out_dir);
        let files = match renderer.render_all(orders, &insights) {
            Ok(files) => files,
            Err(e) => {
                error!("Chart rendering failed: {e}");
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
                return;
            }
        };

        let text = executive_summary(&insights, chrono::Local::now().naive_local(), &files);
        match write_report(&out_dir, &text) {
            Ok(path) => {
                info!("Report written to {}", path.display());
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! {} charts and report saved", files.len()),
                );
                if let Err(e) = open::that(&out_dir) {
                    warn!("Could not open {}: {e}", out_dir.display());
                }
            }
            Err(e) => {
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FiltersChanged => self.apply_filters(),
                        ControlPanelAction::ResetFilters => self.handle_reset_filters(),
                        ControlPanelAction::ExportCsv => self.handle_export_csv(),
                        ControlPanelAction::GenerateReport => self.handle_generate_report(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        let has_data = !self.orders.is_empty();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &self.config, &self.palette, has_data);
        });
    }
}
