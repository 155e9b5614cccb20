//! Control Panel Widget
//! Left side panel with file selection, filters and export controls.

use crate::data::parse::parse_date;
use crate::data::{Category, FilterDomain, OrderFilter, Segment};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

/// Filter state as edited in the panel.
#[derive(Default, Clone)]
pub struct FilterSettings {
    pub csv_path: Option<PathBuf>,
    /// Free-text dates, parsed with the same rules as the input file.
    pub start_text: String,
    pub end_text: String,
    pub category: Option<Category>,
    pub segment: Option<Segment>,
    pub regions: Vec<(String, bool)>,
    pub min_sales: f64,
    pub max_sales: f64,
}

impl FilterSettings {
    /// Widen every filter to the full extent of the loaded data.
    pub fn reset(&mut self, domain: &FilterDomain) {
        self.start_text = domain.first_date.to_string();
        self.end_text = domain.last_date.to_string();
        self.category = None;
        self.segment = None;
        self.regions = domain.regions.iter().map(|r| (r.clone(), true)).collect();
        self.min_sales = domain.min_sales;
        self.max_sales = domain.max_sales;
    }

    /// Build the order filter, or a message describing the invalid input.
    pub fn to_filter(&self) -> Result<OrderFilter, String> {
        let start = Self::date_bound(&self.start_text, "start")?;
        let end = Self::date_bound(&self.end_text, "end")?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(format!("Start date {s} is after end date {e}"));
            }
        }
        if self.min_sales > self.max_sales {
            return Err("Minimum sales is above maximum sales".to_string());
        }

        // All or no regions ticked means no region restriction.
        let regions = if self.regions.iter().all(|(_, on)| *on) || self.no_region_ticked() {
            Vec::new()
        } else {
            self.regions
                .iter()
                .filter(|(_, on)| *on)
                .map(|(r, _)| r.clone())
                .collect()
        };

        Ok(OrderFilter {
            start,
            end,
            category: self.category,
            segment: self.segment,
            regions,
            min_sales: Some(self.min_sales),
            max_sales: Some(self.max_sales),
        })
    }

    /// True when every region box is unticked, which keeps all regions.
    pub fn no_region_ticked(&self) -> bool {
        self.regions.iter().all(|(_, on)| !*on)
    }

    fn date_bound(text: &str, which: &str) -> Result<Option<chrono::NaiveDate>, String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        parse_date(text)
            .map(Some)
            .ok_or_else(|| format!("Invalid {which} date: {text}"))
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub settings: FilterSettings,
    pub domain: Option<FilterDomain>,
    /// One-line description of the loaded file.
    pub data_info: String,
    pub progress: f32,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: FilterSettings::default(),
            domain: None,
            data_info: String::new(),
            progress: 0.0,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the filters from freshly loaded data.
    pub fn set_domain(&mut self, domain: FilterDomain) {
        self.settings.reset(&domain);
        self.domain = Some(domain);
    }

    fn data_loaded(&self) -> bool {
        self.domain.is_some()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Superstore Insights")
                    .size(22.0)
                    .color(Color32::from_rgb(46, 134, 171)),
            );
            ui.label(
                RichText::new("Sales & Profit Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
                if !self.data_info.is_empty() {
                    ui.label(RichText::new(&self.data_info).size(11.0).color(Color32::GRAY));
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        let mut changed = false;
        let label_width = 80.0;
        let combo_width = 170.0;

        ui.add_enabled_ui(self.data_loaded(), |ui| {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("From:"));
                let edit = egui::TextEdit::singleline(&mut self.settings.start_text)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(combo_width);
                changed |= ui.add(edit).lost_focus();
            });
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("To:"));
                let edit = egui::TextEdit::singleline(&mut self.settings.end_text)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(combo_width);
                changed |= ui.add(edit).lost_focus();
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Category:"));
                let selected = self
                    .settings
                    .category
                    .map_or("All", |c| c.as_str());
                ComboBox::from_id_salt("category_filter")
                    .width(combo_width)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        changed |= ui
                            .selectable_value(&mut self.settings.category, None, "All")
                            .changed();
                        for category in Category::LEGEND_ORDER {
                            changed |= ui
                                .selectable_value(
                                    &mut self.settings.category,
                                    Some(category),
                                    category.as_str(),
                                )
                                .changed();
                        }
                    });
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Segment:"));
                let selected = self.settings.segment.map_or("All", |s| s.as_str());
                ComboBox::from_id_salt("segment_filter")
                    .width(combo_width)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        changed |= ui
                            .selectable_value(&mut self.settings.segment, None, "All")
                            .changed();
                        for segment in Segment::ALL {
                            changed |= ui
                                .selectable_value(
                                    &mut self.settings.segment,
                                    Some(segment),
                                    segment.as_str(),
                                )
                                .changed();
                        }
                    });
            });

            ui.add_space(8.0);
            ui.label("Regions:");
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                        for (region, on) in self.settings.regions.iter_mut() {
                            changed |= ui.checkbox(on, region.as_str()).changed();
                        }
                    });
                });

            ui.add_space(5.0);
            ui.horizontal(|ui| {
                if ui.small_button("Select All").clicked() {
                    self.settings.regions.iter_mut().for_each(|(_, on)| *on = true);
                    changed = true;
                }
                let can_clear = !self.settings.no_region_ticked();
                if ui.add_enabled(can_clear, egui::Button::new("Clear All").small()).clicked() {
                    self.settings.regions.iter_mut().for_each(|(_, on)| *on = false);
                    changed = true;
                }
            });
            if self.settings.no_region_ticked() {
                ui.label(
                    RichText::new("None selected = all regions")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            }

            if let Some(domain) = &self.domain {
                ui.add_space(8.0);
                ui.label("Sales range ($):");
                let range = domain.min_sales..=domain.max_sales;
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.settings.min_sales, range.clone())
                            .logarithmic(true)
                            .text("Min"),
                    )
                    .drag_stopped();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.settings.max_sales, range)
                            .logarithmic(true)
                            .text("Max"),
                    )
                    .drag_stopped();
            }
        });

        if changed {
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.data_loaded(), |ui| {
                if ui.button("↺ Reset Filters").clicked() {
                    action = ControlPanelAction::ResetFilters;
                }

                ui.add_space(8.0);

                let export = egui::Button::new(RichText::new("💾 Export Filtered CSV").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(export).clicked() {
                    action = ControlPanelAction::ExportCsv;
                }

                ui.add_space(8.0);

                let report = egui::Button::new(RichText::new("▶ Generate Charts & Report").size(14.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(report).clicked() {
                    action = ControlPanelAction::GenerateReport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FiltersChanged,
    ResetFilters,
    ExportCsv,
    GenerateReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn domain() -> FilterDomain {
        FilterDomain {
            first_date: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2014, 12, 31).unwrap(),
            min_sales: 1.0,
            max_sales: 5000.0,
            regions: vec!["Central".to_string(), "East".to_string(), "West".to_string()],
        }
    }

    #[test]
    fn reset_settings_cover_whole_domain() {
        let mut settings = FilterSettings::default();
        settings.reset(&domain());
        let filter = settings.to_filter().unwrap();

        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2011, 1, 1));
        assert_eq!(filter.end, NaiveDate::from_ymd_opt(2014, 12, 31));
        assert!(filter.regions.is_empty());
        assert_eq!(filter.min_sales, Some(1.0));
        assert_eq!(filter.max_sales, Some(5000.0));
    }

    #[test]
    fn partial_region_selection_restricts() {
        let mut settings = FilterSettings::default();
        settings.reset(&domain());
        settings.regions[1].1 = false;
        settings.category = Some(Category::Furniture);
        settings.start_text = "05/03/2013".to_string();

        let filter = settings.to_filter().unwrap();
        assert_eq!(filter.regions, vec!["Central".to_string(), "West".to_string()]);
        assert_eq!(filter.category, Some(Category::Furniture));
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2013, 3, 5));
    }

    #[test]
    fn cleared_regions_keep_every_region() {
        let mut settings = FilterSettings::default();
        settings.reset(&domain());
        assert!(!settings.no_region_ticked());

        settings.regions.iter_mut().for_each(|(_, on)| *on = false);
        assert!(settings.no_region_ticked());
        assert!(settings.to_filter().unwrap().regions.is_empty());
    }

    #[test]
    fn invalid_input_is_reported() {
        let mut settings = FilterSettings::default();
        settings.reset(&domain());

        settings.start_text = "not a date".to_string();
        assert!(settings.to_filter().unwrap_err().contains("start date"));

        settings.start_text = "2014-06-01".to_string();
        settings.end_text = "2013-06-01".to_string();
        assert!(settings.to_filter().is_err());

        settings.end_text = String::new();
        assert_eq!(settings.to_filter().unwrap().end, None);
    }
}
