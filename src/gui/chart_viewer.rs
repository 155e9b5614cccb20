//! Chart Viewer Widget
//! Central scrollable dashboard: KPI cards, charts and order tables for the
//! currently filtered orders.

use crate::charts::{color32, ChartPlotter};
use crate::config::{AnalysisConfig, Palette};
use crate::data::EnrichedOrder;
use crate::stats::{
    aggregate, AggregateRow, GroupKey, HistogramBin, Kpis, RowOrder, StatsCalculator,
};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 15.0;
const KPI_CARD_WIDTH: f32 = 170.0;
const PREVIEW_ROWS: usize = 50;

/// Leading rows of the filtered selection shown in the preview table.
fn preview_rows(orders: &[EnrichedOrder]) -> &[EnrichedOrder] {
    &orders[..orders.len().min(PREVIEW_ROWS)]
}

/// Everything the dashboard shows for one filter state.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub kpis: Kpis,
    pub by_category: Vec<AggregateRow>,
    pub category_margin: Vec<AggregateRow>,
    pub segment_margin: Vec<AggregateRow>,
    pub by_discount: Vec<AggregateRow>,
    pub monthly: Vec<AggregateRow>,
    pub histogram: Vec<HistogramBin>,
    pub top_orders: Vec<EnrichedOrder>,
    pub worst_orders: Vec<EnrichedOrder>,
}

impl DashboardView {
    /// `None` when no order survives the filters.
    pub fn compute(orders: &[EnrichedOrder], config: &AnalysisConfig) -> Option<Self> {
        let kpis = StatsCalculator::kpis(orders).ok()?;
        let group = |key: GroupKey, order: RowOrder| aggregate(orders, &key, &order).ok();

        Some(Self {
            kpis,
            by_category: group(GroupKey::Category, RowOrder::SalesDescending)?,
            category_margin: group(GroupKey::Category, RowOrder::category_legend())?,
            segment_margin: group(GroupKey::Segment, RowOrder::MeanMarginDescending)?,
            by_discount: group(GroupKey::DiscountBucket, RowOrder::KeyAscending)?,
            monthly: group(GroupKey::YearMonth, RowOrder::KeyAscending)?,
            histogram: StatsCalculator::margin_histogram(orders, config.histogram_bins),
            top_orders: StatsCalculator::top_profitable(orders, config.top_n)
                .into_iter()
                .cloned()
                .collect(),
            worst_orders: StatsCalculator::biggest_losses(orders, config.top_n)
                .into_iter()
                .cloned()
                .collect(),
        })
    }
}

/// Scrollable dashboard area.
pub struct ChartViewer {
    pub orders: Vec<EnrichedOrder>,
    pub view: Option<DashboardView>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            orders: Vec::new(),
            view: None,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.view = None;
    }

    /// Replace the filtered orders and recompute every summary.
    pub fn set_orders(&mut self, orders: Vec<EnrichedOrder>, config: &AnalysisConfig) {
        self.view = DashboardView::compute(&orders, config);
        self.orders = orders;
    }

    pub fn show(&self, ui: &mut egui::Ui, config: &AnalysisConfig, palette: &Palette, has_data: bool) {
        let Some(view) = &self.view else {
            let message = if has_data {
                "No orders match the current filters"
            } else {
                "No Data"
            };
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(message).size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_kpi_cards(ui, &view.kpis, palette);
                ui.add_space(CARD_SPACING);

                ui.columns(2, |cols| {
                    Self::card(&mut cols[0], "Sales by Category", |ui| {
                        ChartPlotter::draw_sales_bars(ui, "category_sales", &view.by_category, palette);
                    });
                    Self::card(&mut cols[1], "Mean Order Margin by Category", |ui| {
                        ChartPlotter::draw_margin_bars(
                            ui,
                            "category_margin",
                            &view.category_margin,
                            palette,
                            config.margin_benchmark,
                        );
                    });
                });
                ui.add_space(CARD_SPACING);

                Self::card(ui, "Monthly Sales Trend", |ui| {
                    ChartPlotter::draw_monthly_trend(ui, &view.monthly, palette);
                });
                ui.add_space(CARD_SPACING);

                Self::card(ui, "Sales vs Profit", |ui| {
                    ChartPlotter::draw_scatter(
                        ui,
                        &self.orders,
                        palette,
                        config.disaster_sales_threshold,
                        config.scatter_points,
                    );
                });
                ui.add_space(CARD_SPACING);

                ui.columns(2, |cols| {
                    Self::card(&mut cols[0], "Discount vs Margin", |ui| {
                        ChartPlotter::draw_discount_scatter(ui, &self.orders, palette, config.scatter_points);
                    });
                    Self::card(&mut cols[1], "Discount Impact (mean order margin)", |ui| {
                        ChartPlotter::draw_margin_bars(
                            ui,
                            "discount_margin",
                            &view.by_discount,
                            palette,
                            config.margin_benchmark,
                        );
                    });
                });
                ui.add_space(CARD_SPACING);

                ui.columns(2, |cols| {
                    Self::card(&mut cols[0], "Profit Margin Distribution", |ui| {
                        ChartPlotter::draw_histogram(ui, &view.histogram, palette);
                    });
                    Self::card(&mut cols[1], "Mean Order Margin by Segment", |ui| {
                        ChartPlotter::draw_margin_bars(
                            ui,
                            "segment_margin",
                            &view.segment_margin,
                            palette,
                            config.margin_benchmark,
                        );
                    });
                });
                ui.add_space(CARD_SPACING);

                ui.columns(2, |cols| {
                    Self::card(&mut cols[0], "🏆 Most Profitable Orders", |ui| {
                        Self::draw_order_table(ui, "top_orders", &view.top_orders);
                    });
                    Self::card(&mut cols[1], "⚠ Biggest Losses", |ui| {
                        Self::draw_order_table(ui, "worst_orders", &view.worst_orders);
                    });
                });
                ui.add_space(CARD_SPACING);

                let preview = preview_rows(&self.orders);
                let title = format!("Filtered Orders (first {} of {})", preview.len(), self.orders.len());
                Self::card(ui, &title, |ui| {
                    Self::draw_preview_table(ui, preview);
                });
            });
    }

    fn card(ui: &mut egui::Ui, title: &str, body: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(8.0);
                body(ui);
            });
    }

    fn draw_kpi_cards(ui: &mut egui::Ui, kpis: &Kpis, palette: &Palette) {
        let profit_color = if kpis.total_profit < 0.0 {
            color32(palette.danger)
        } else {
            color32(palette.success)
        };
        let cards = [
            ("Total Sales", format!("${:.2}M", kpis.total_sales / 1e6), color32(palette.primary)),
            ("Total Profit", format!("${:.2}M", kpis.total_profit / 1e6), profit_color),
            ("Overall Margin", format!("{:.1}%", kpis.overall_margin), color32(palette.tertiary)),
            ("Mean Order Margin", format!("{:.1}%", kpis.mean_margin), color32(palette.tertiary)),
            ("Orders", kpis.order_count.to_string(), color32(palette.secondary)),
            (
                "Loss Orders",
                format!("{} ({:.1}%)", kpis.loss_orders, kpis.loss_order_pct),
                color32(palette.danger),
            ),
        ];

        ui.horizontal_wrapped(|ui| {
            for (label, value, color) in cards {
                egui::Frame::none()
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(2.0, color))
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(10.0)
                    .show(ui, |ui| {
                        ui.set_width(KPI_CARD_WIDTH);
                        ui.vertical(|ui| {
                            ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                            ui.label(RichText::new(value).size(20.0).strong().color(color));
                        });
                    });
                ui.add_space(CARD_SPACING / 2.0);
            }
        });
    }

    fn draw_preview_table(ui: &mut egui::Ui, orders: &[EnrichedOrder]) {
        egui::Grid::new(ui.make_persistent_id("filtered_preview"))
            .striped(true)
            .min_col_width(60.0)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                for header in ["Order Date", "Category", "Segment", "Region", "Sales", "Profit", "Margin"] {
                    ui.label(RichText::new(header).strong().size(11.0));
                }
                ui.end_row();

                for order in orders {
                    let r = &order.record;
                    ui.label(RichText::new(r.order_date.format("%Y-%m-%d").to_string()).size(11.0));
                    ui.label(RichText::new(r.category.as_str()).size(11.0));
                    ui.label(RichText::new(r.segment.as_str()).size(11.0));
                    ui.label(RichText::new(&r.region).size(11.0));
                    ui.label(RichText::new(format!("{:.2}", r.sales_clean)).size(11.0));
                    ui.label(RichText::new(format!("{:.2}", r.profit_clean)).size(11.0));
                    ui.label(RichText::new(format!("{:.1}%", order.profit_margin)).size(11.0));
                    ui.end_row();
                }
            });
    }

    fn draw_order_table(ui: &mut egui::Ui, id: &str, orders: &[EnrichedOrder]) {
        egui::Grid::new(ui.make_persistent_id(id))
            .striped(true)
            .min_col_width(55.0)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Product").strong().size(11.0));
                ui.label(RichText::new("Category").strong().size(11.0));
                ui.label(RichText::new("Sales").strong().size(11.0));
                ui.label(RichText::new("Profit").strong().size(11.0));
                ui.label(RichText::new("Margin").strong().size(11.0));
                ui.end_row();

                let default_text_color = ui.visuals().text_color();
                for order in orders {
                    let profit_color = if order.is_loss() {
                        Color32::from_rgb(220, 53, 69)
                    } else {
                        default_text_color
                    };
                    let name: String = order.record.product_name.chars().take(40).collect();
                    ui.label(RichText::new(name).size(11.0));
                    ui.label(RichText::new(order.record.category.as_str()).size(11.0));
                    ui.label(RichText::new(format!("{:.2}", order.sales())).size(11.0));
                    ui.label(
                        RichText::new(format!("{:.2}", order.profit()))
                            .size(11.0)
                            .color(profit_color),
                    );
                    ui.label(RichText::new(format!("{:.1}%", order.profit_margin)).size(11.0));
                    ui.end_row();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Category, DataProcessor, OrderRecord, Segment};
    use crate::stats::KeyValue;
    use chrono::NaiveDate;

    fn order(category: Category, sales: f64, profit: f64) -> EnrichedOrder {
        DataProcessor::derive(OrderRecord {
            source_row: 0,
            order_date: NaiveDate::from_ymd_opt(2014, 2, 1).unwrap(),
            ship_date: NaiveDate::from_ymd_opt(2014, 2, 4).unwrap(),
            category,
            segment: Segment::Corporate,
            region: "South".to_string(),
            market: "APAC".to_string(),
            country: "India".to_string(),
            product_name: "Item".to_string(),
            sales_clean: sales,
            profit_clean: profit,
            discount_clean: 0.2,
        })
        .unwrap()
    }

    #[test]
    fn preview_shows_leading_rows_in_order() {
        let orders: Vec<EnrichedOrder> = (0..60)
            .map(|i| order(Category::Technology, 100.0 + i as f64, 10.0))
            .collect();
        let preview = preview_rows(&orders);
        assert_eq!(preview.len(), PREVIEW_ROWS);
        assert_eq!(preview[0].sales(), 100.0);
        assert_eq!(preview[PREVIEW_ROWS - 1].sales(), 149.0);
        assert_eq!(preview_rows(&orders[..3]).len(), 3);
    }

    #[test]
    fn empty_selection_has_no_view() {
        let mut viewer = ChartViewer::new();
        viewer.set_orders(Vec::new(), &AnalysisConfig::default());
        assert!(viewer.view.is_none());
    }

    #[test]
    fn view_follows_legend_order_and_limits_tables() {
        let config = AnalysisConfig {
            top_n: 2,
            ..AnalysisConfig::default()
        };
        let orders = vec![
            order(Category::Furniture, 900.0, -90.0),
            order(Category::Technology, 100.0, 30.0),
            order(Category::OfficeSupplies, 50.0, 5.0),
        ];
        let mut viewer = ChartViewer::new();
        viewer.set_orders(orders, &config);
        let view = viewer.view.as_ref().unwrap();

        let legend: Vec<KeyValue> = view.category_margin.iter().map(|r| r.key.clone()).collect();
        assert_eq!(
            legend,
            vec![
                KeyValue::Category(Category::Technology),
                KeyValue::Category(Category::OfficeSupplies),
                KeyValue::Category(Category::Furniture),
            ]
        );
        assert_eq!(view.by_category[0].key, KeyValue::Category(Category::Furniture));
        assert_eq!(view.top_orders.len(), 2);
        assert_eq!(view.worst_orders[0].record.category, Category::Furniture);
        assert_eq!(view.histogram.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(view.kpis.order_count, 3);
    }
}
