//! Chart Plotter Module
//! Interactive dashboard charts drawn with egui_plot.

use crate::charts::{key_color, sample_evenly, scatter_sample};
use crate::config::{Palette, Rgb};
use crate::data::{Category, EnrichedOrder};
use crate::stats::{AggregateRow, HistogramBin};
use egui::Color32;
use egui_plot::{Bar, BarChart, HLine, Legend, Line, Plot, PlotPoints, PlotUi, Points, VLine};

const CHART_HEIGHT: f32 = 260.0;

/// Low-to-high sales shades for the discount scatter.
const SALES_RAMP: [Color32; 5] = [
    Color32::from_rgb(68, 1, 84),
    Color32::from_rgb(59, 82, 139),
    Color32::from_rgb(33, 145, 140),
    Color32::from_rgb(94, 201, 98),
    Color32::from_rgb(253, 231, 37),
];

pub fn color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

/// Label for a category axis mark; only marks on a bar position get text.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 0.05 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Index into `SALES_RAMP` for `sales` on a `0..=max` scale.
fn sales_band(sales: f64, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    let bands = SALES_RAMP.len();
    ((sales / max * bands as f64) as usize).min(bands - 1)
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// One bar per group, shared by the sales and margin charts.
    fn group_bars(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[AggregateRow],
        palette: &Palette,
        y_label: &str,
        value: impl Fn(&AggregateRow) -> f64,
        overlay: impl FnOnce(&mut PlotUi),
    ) {
        let labels: Vec<String> = rows.iter().map(AggregateRow::label).collect();
        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Bar::new(i as f64, value(row))
                    .width(0.6)
                    .fill(color32(key_color(palette, &row.key)))
                    .name(row.label())
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label(y_label)
            .legend(Legend::default())
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
                overlay(plot_ui);
            });
    }

    /// Summed sales per group.
    pub fn draw_sales_bars(ui: &mut egui::Ui, id: &str, rows: &[AggregateRow], palette: &Palette) {
        Self::group_bars(ui, id, rows, palette, "Sales ($)", |r| r.sales_sum, |_| {});
    }

    /// Mean order margin per group with break-even and benchmark lines.
    pub fn draw_margin_bars(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[AggregateRow],
        palette: &Palette,
        benchmark: f64,
    ) {
        let danger = color32(palette.danger);
        let success = color32(palette.success);
        Self::group_bars(
            ui,
            id,
            rows,
            palette,
            "Mean order margin (%)",
            |r| r.mean_margin,
            |plot_ui| {
                plot_ui.hline(HLine::new(0.0).color(danger).width(1.5).name("Break-even"));
                plot_ui.hline(
                    HLine::new(benchmark)
                        .color(success)
                        .width(1.5)
                        .name(format!("Benchmark ({benchmark:.0}%)")),
                );
            },
        );
    }

    /// Summed sales per month, in chronological order.
    pub fn draw_monthly_trend(ui: &mut egui::Ui, monthly: &[AggregateRow], palette: &Palette) {
        let labels: Vec<String> = monthly.iter().map(AggregateRow::label).collect();
        let points: Vec<[f64; 2]> = monthly
            .iter()
            .enumerate()
            .map(|(i, row)| [i as f64, row.sales_sum])
            .collect();
        let color = color32(palette.primary);

        Plot::new("monthly_trend")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label("Sales ($)")
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(color)
                        .width(2.0)
                        .fill(0.0)
                        .name("Monthly Sales"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(3.0)
                        .color(color),
                );
            });
    }

    /// Sales against profit per order, colored by category, capped at `limit` points.
    /// Discount disasters are always drawn.
    pub fn draw_scatter(
        ui: &mut egui::Ui,
        orders: &[EnrichedOrder],
        palette: &Palette,
        disaster_threshold: f64,
        limit: usize,
    ) {
        let sample = scatter_sample(orders, limit, disaster_threshold);
        let danger = color32(palette.danger);
        let warning = color32(palette.warning);

        Plot::new("sales_profit_scatter")
            .height(CHART_HEIGHT + 60.0)
            .allow_scroll(false)
            .x_axis_label("Sales ($)")
            .y_axis_label("Profit ($)")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for category in Category::LEGEND_ORDER {
                    let points: PlotPoints = sample
                        .iter()
                        .filter(|o| o.record.category == category)
                        .map(|o| [o.sales(), o.profit()])
                        .collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(2.5)
                            .color(color32(palette.category(category)).gamma_multiply(0.7))
                            .name(category.as_str()),
                    );
                }
                plot_ui.hline(HLine::new(0.0).color(danger).name("Break-even"));
                plot_ui.vline(
                    VLine::new(disaster_threshold)
                        .color(warning)
                        .name(format!("High sales (${disaster_threshold:.0})")),
                );
            });
    }

    /// Discount rate against order margin, shaded by sales, capped at `limit` points.
    pub fn draw_discount_scatter(ui: &mut egui::Ui, orders: &[EnrichedOrder], palette: &Palette, limit: usize) {
        let sample = sample_evenly(orders, limit);
        let max_sales = sample.iter().map(|o| o.sales()).fold(0.0, f64::max);
        let step = max_sales / SALES_RAMP.len() as f64;
        let danger = color32(palette.danger);

        Plot::new("discount_margin_scatter")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Discount rate")
            .y_axis_label("Profit margin (%)")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (band, color) in SALES_RAMP.iter().enumerate() {
                    let points: Vec<[f64; 2]> = sample
                        .iter()
                        .filter(|o| sales_band(o.sales(), max_sales) == band)
                        .map(|o| [o.record.discount_clean, o.profit_margin])
                        .collect();
                    if points.is_empty() {
                        continue;
                    }
                    plot_ui.points(
                        Points::new(PlotPoints::new(points))
                            .radius(2.5)
                            .color(color.gamma_multiply(0.7))
                            .name(format!(
                                "Sales ${:.0} - ${:.0}",
                                step * band as f64,
                                step * (band + 1) as f64
                            )),
                    );
                }
                plot_ui.hline(HLine::new(0.0).color(danger).name("Break-even"));
            });
    }

    /// Distribution of per-order margins.
    pub fn draw_histogram(ui: &mut egui::Ui, bins: &[HistogramBin], palette: &Palette) {
        let color = color32(palette.secondary);
        let bars: Vec<Bar> = bins
            .iter()
            .map(|b| {
                let width = (b.upper - b.lower).max(f64::EPSILON);
                Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                    .width(width)
                    .fill(color.gamma_multiply(0.8))
            })
            .collect();

        Plot::new("margin_histogram")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Profit margin (%)")
            .y_axis_label("Orders")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Orders"));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_labels_only_on_bar_positions() {
        let labels = vec!["Technology".to_string(), "Furniture".to_string()];
        assert_eq!(category_label(&labels, 0.0), "Technology");
        assert_eq!(category_label(&labels, 1.02), "Furniture");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn sales_bands_span_the_ramp() {
        assert_eq!(sales_band(0.0, 100.0), 0);
        assert_eq!(sales_band(39.9, 100.0), 1);
        assert_eq!(sales_band(60.0, 100.0), 3);
        assert_eq!(sales_band(100.0, 100.0), SALES_RAMP.len() - 1);
        assert_eq!(sales_band(5.0, 0.0), 0);
    }

    #[test]
    fn palette_colors_convert() {
        assert_eq!(color32(Rgb(46, 134, 171)), Color32::from_rgb(46, 134, 171));
    }
}
