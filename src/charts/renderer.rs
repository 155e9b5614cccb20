//! Static Chart Renderer
//! Writes the analysis charts as PNG files with the plotters bitmap backend.
//!
//! Charts:
//! 1. Monthly sales trend (line + area, peak annotated)
//! 2. Revenue by segment (pie)
//! 3. Revenue by category (pie)
//! 4. Mean profit margin by category, legend order, break-even and benchmark lines
//! 5. Sales vs profit scatter with the discount-disaster zone
//! 6. Mean profit margin by segment, best first
//! 7. Mean profit margin by discount bucket

use crate::config::{AnalysisConfig, Palette, Rgb};
use crate::data::{Category, EnrichedOrder};
use crate::pipeline::Insights;
use crate::charts::key_color;
use crate::stats::{sales_shares, AggregateRow};
use plotters::element::Pie;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to draw {chart}: {message}")]
    Draw { chart: String, message: String },
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

const FONT: &str = "sans-serif";

pub const MONTHLY_TREND: &str = "chart1_monthly_trend.png";
pub const SEGMENT_PIE: &str = "chart2_segment_pie.png";
pub const CATEGORY_PIE: &str = "chart3_category_pie.png";
pub const CATEGORY_MARGIN: &str = "chart4_profit_margin.png";
pub const SALES_PROFIT_SCATTER: &str = "chart5_sales_profit_scatter.png";
pub const SEGMENT_MARGIN: &str = "chart6_segment_margin.png";
pub const DISCOUNT_MARGIN: &str = "chart7_discount_margin.png";

/// One bar of a categorical margin chart.
struct MarginBar {
    label: String,
    value: f64,
    color: RGBColor,
}

/// Horizontal line drawn across a bar chart.
struct ReferenceLine {
    y: f64,
    label: String,
    color: RGBColor,
}

pub struct StaticChartRenderer<'a> {
    config: &'a AnalysisConfig,
    palette: &'a Palette,
    out_dir: PathBuf,
}

impl<'a> StaticChartRenderer<'a> {
    pub fn new(config: &'a AnalysisConfig, palette: &'a Palette, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            palette,
            out_dir: out_dir.into(),
        }
    }

    /// Render every chart, returning the written paths in chart order.
    pub fn render_all(&self, orders: &[EnrichedOrder], insights: &Insights) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|source| RenderError::OutputDir {
            path: self.out_dir.display().to_string(),
            source,
        })?;

        let mut written = Vec::with_capacity(7);
        written.push(self.render(MONTHLY_TREND, |p| self.monthly_trend(p, &insights.monthly))?);
        written.push(self.render(SEGMENT_PIE, |p| {
            self.share_pie(p, "Revenue by Customer Segment", &insights.by_segment)
        })?);
        written.push(self.render(CATEGORY_PIE, |p| {
            self.share_pie(p, "Revenue by Product Category", &insights.by_category)
        })?);
        written.push(self.render(CATEGORY_MARGIN, |p| {
            self.margin_chart(
                p,
                "Average Profit Margin by Category",
                &insights.category_margin,
                true,
            )
        })?);
        written.push(self.render(SALES_PROFIT_SCATTER, |p| {
            self.sales_profit_scatter(p, orders, insights.disaster_count)
        })?);
        written.push(self.render(SEGMENT_MARGIN, |p| {
            self.margin_chart(
                p,
                "Profit Margin by Customer Segment",
                &insights.segment_margin,
                false,
            )
        })?);
        written.push(self.render(DISCOUNT_MARGIN, |p| {
            self.margin_chart(p, "Profit Margin by Discount Level", &insights.by_discount, true)
        })?);

        info!("Saved {} charts to {}", written.len(), self.out_dir.display());
        Ok(written)
    }

    fn render(&self, file_name: &str, draw: impl FnOnce(&Path) -> DrawResult) -> Result<PathBuf, RenderError> {
        let path = self.out_dir.join(file_name);
        draw(&path).map_err(|e| RenderError::Draw {
            chart: file_name.to_string(),
            message: e.to_string(),
        })?;
        debug!("Saved: {}", path.display());
        Ok(path)
    }

    fn size(&self) -> (u32, u32) {
        (self.config.chart_width, self.config.chart_height)
    }

    fn monthly_trend(&self, path: &Path, monthly: &[AggregateRow]) -> DrawResult {
        let root = BitMapBackend::new(path, self.size()).into_drawing_area();
        root.fill(&WHITE)?;

        let labels: Vec<String> = monthly.iter().map(AggregateRow::label).collect();
        let points: Vec<(i32, f64)> = monthly
            .iter()
            .enumerate()
            .map(|(i, row)| (i as i32, row.sales_sum))
            .collect();
        let (_, hi) = padded_bounds(points.iter().map(|p| p.1));
        let last = (points.len() as i32 - 1).max(1);
        let primary = rgb(self.palette.primary);

        let title = match (labels.first(), labels.last()) {
            (Some(first), Some(last)) => format!("Monthly Sales Trend ({first} to {last})"),
            _ => "Monthly Sales Trend".to_string(),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 32))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(0i32..last, 0f64..hi)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Total Sales ($)")
            .x_labels(labels.len().min(16))
            .x_label_formatter(&|x| labels.get(*x as usize).cloned().unwrap_or_default())
            .y_label_formatter(&|y| format!("${:.1}M", y / 1e6))
            .draw()?;

        chart.draw_series(
            AreaSeries::new(points.iter().copied(), 0.0, primary.mix(0.3)).border_style(primary.stroke_width(3)),
        )?
        .label("Monthly Sales")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], primary.stroke_width(3)));

        chart.draw_series(points.iter().map(|p| Circle::new(*p, 4, primary.filled())))?;

        if let Some(peak) = points.iter().max_by(|a, b| a.1.total_cmp(&b.1)) {
            let warning = rgb(self.palette.warning);
            chart.draw_series(std::iter::once(
                EmptyElement::at(*peak)
                    + Circle::new((0, 0), 7, warning.filled())
                    + Text::new(format!("Peak: ${:.2}M", peak.1 / 1e6), (10, -25), (FONT, 20).into_font()),
            ))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn share_pie(&self, path: &Path, title: &str, rows: &[AggregateRow]) -> DrawResult {
        let root = BitMapBackend::new(path, self.size()).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(title, (FONT, 36))?;

        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.35;

        let sizes = sales_shares(rows);
        let colors: Vec<RGBColor> = rows.iter().map(|r| rgb(key_color(self.palette, &r.key))).collect();
        let labels: Vec<String> = rows
            .iter()
            .map(|r| format!("{} (${:.2}M)", r.label(), r.sales_sum / 1e6))
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.label_style((FONT, 22).into_font().color(&BLACK));
        pie.percentages((FONT, 22).into_font().color(&WHITE));
        area.draw(&pie)?;

        root.present()?;
        Ok(())
    }

    /// Mean order margin per group as colored bars with value labels.
    fn margin_chart(&self, path: &Path, title: &str, rows: &[AggregateRow], break_even: bool) -> DrawResult {
        let bars: Vec<MarginBar> = rows
            .iter()
            .map(|r| MarginBar {
                label: r.label(),
                value: r.mean_margin,
                color: rgb(key_color(self.palette, &r.key)),
            })
            .collect();

        let mut lines = Vec::with_capacity(2);
        if break_even {
            lines.push(ReferenceLine {
                y: 0.0,
                label: "Break-even".to_string(),
                color: rgb(self.palette.danger),
            });
        }
        lines.push(ReferenceLine {
            y: self.config.margin_benchmark,
            label: format!("Benchmark ({:.0}%)", self.config.margin_benchmark),
            color: rgb(self.palette.success),
        });

        let root = BitMapBackend::new(path, self.size()).into_drawing_area();
        root.fill(&WHITE)?;

        let (lo, hi) = padded_bounds(bars.iter().map(|b| b.value).chain(lines.iter().map(|l| l.y)));
        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 32))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(bar_axis(bars.len()).into_segmented(), lo..hi)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Profit Margin (%)")
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => bars
                    .get(*i as usize)
                    .map(|b| b.label.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| format!("{y:.0}%"))
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let i = i as i32;
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
                bar.color.filled(),
            );
            rect.set_margin(0, 0, 25, 25);
            rect
        }))?;

        chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
            EmptyElement::at((SegmentValue::CenterOf(i as i32), bar.value))
                + Text::new(format!("{:.1}%", bar.value), (-20, -25), (FONT, 20).into_font())
        }))?;

        for line in &lines {
            let color = line.color;
            chart
                .draw_series(LineSeries::new(
                    vec![(SegmentValue::Exact(0), line.y), (SegmentValue::Last, line.y)],
                    color.stroke_width(2),
                ))?
                .label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn sales_profit_scatter(&self, path: &Path, orders: &[EnrichedOrder], disaster_count: usize) -> DrawResult {
        let root = BitMapBackend::new(path, self.size()).into_drawing_area();
        root.fill(&WHITE)?;

        let threshold = self.config.disaster_sales_threshold;
        let (_, max_sales) = padded_bounds(orders.iter().map(|o| o.sales()).chain([threshold]));
        let (min_profit, max_profit) = padded_bounds(orders.iter().map(|o| o.profit()));
        let danger = rgb(self.palette.danger);
        let warning = rgb(self.palette.warning);

        let mut chart = ChartBuilder::on(&root)
            .caption("Sales vs Profit: Discount Disasters", (FONT, 32))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..max_sales, min_profit..max_profit)?;

        chart
            .configure_mesh()
            .x_desc("Sales ($)")
            .y_desc("Profit ($)")
            .draw()?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(threshold, min_profit), (max_sales, 0.0)],
                danger.mix(0.15).filled(),
            )))?
            .label("Discount Disaster Zone")
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], danger.mix(0.3).filled()));

        for category in Category::LEGEND_ORDER {
            let color = rgb(self.palette.category(category));
            chart
                .draw_series(
                    category_points(orders, category)
                        .into_iter()
                        .map(|p| Circle::new(p, 4, color.mix(0.6).filled())),
                )?
                .label(category.as_str())
                .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
        }

        chart
            .draw_series(LineSeries::new(
                vec![(0.0, 0.0), (max_sales, 0.0)],
                danger.stroke_width(2),
            ))?
            .label("Break-even")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], danger.stroke_width(2)));

        chart
            .draw_series(LineSeries::new(
                vec![(threshold, min_profit), (threshold, max_profit)],
                warning.stroke_width(2),
            ))?
            .label(format!("High Sales Threshold (${threshold:.0})"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], warning.stroke_width(2)));

        if min_profit < 0.0 {
            chart.draw_series(std::iter::once(Text::new(
                format!("{disaster_count} orders here (high sales, negative profit)"),
                (threshold, min_profit * 0.5),
                (FONT, 18).into_font().color(&danger),
            )))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Every order of `category` as a (sales, profit) point.
fn category_points(orders: &[EnrichedOrder], category: Category) -> Vec<(f64, f64)> {
    orders
        .iter()
        .filter(|o| o.record.category == category)
        .map(|o| (o.sales(), o.profit()))
        .collect()
}

/// Integer axes include their end point, so `0..n-1` yields one segment per bar.
fn bar_axis(bars: usize) -> Range<i32> {
    0..(bars.max(2) as i32 - 1)
}

/// Value range including zero, padded so labels above bars stay inside the plot.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (hi - lo).max(1.0);
    let lo = if lo < 0.0 { lo - span * 0.1 } else { lo };
    (lo, hi + span * 0.15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_always_include_zero() {
        let (lo, hi) = padded_bounds([14.0, 7.0, 10.0].into_iter());
        assert_eq!(lo, 0.0);
        assert!((hi - 16.1).abs() < 1e-9);

        let (lo, hi) = padded_bounds([-20.0, 30.0].into_iter());
        assert!((lo - -25.0).abs() < 1e-9);
        assert!((hi - 37.5).abs() < 1e-9);
    }

    #[test]
    fn bounds_of_nothing_are_usable() {
        let (lo, hi) = padded_bounds(std::iter::empty());
        assert_eq!(lo, 0.0);
        assert!(hi > lo);
    }

    #[test]
    fn scatter_points_cover_every_disaster() {
        use crate::data::{DataProcessor, OrderRecord, Segment};
        use chrono::NaiveDate;

        let orders: Vec<EnrichedOrder> = (0..2000)
            .map(|i| {
                let (category, sales, profit) = match i % 400 {
                    7 => (Category::Furniture, 2500.0, -800.0),
                    n if n % 2 == 0 => (Category::Technology, 120.0, 15.0),
                    _ => (Category::OfficeSupplies, 40.0, 4.0),
                };
                DataProcessor::derive(OrderRecord {
                    source_row: i,
                    order_date: NaiveDate::from_ymd_opt(2014, 6, 1).unwrap(),
                    ship_date: NaiveDate::from_ymd_opt(2014, 6, 3).unwrap(),
                    category,
                    segment: Segment::Consumer,
                    region: "Oceania".to_string(),
                    market: "APAC".to_string(),
                    country: "Australia".to_string(),
                    product_name: "Bookcase".to_string(),
                    sales_clean: sales,
                    profit_clean: profit,
                    discount_clean: 0.4,
                })
                .unwrap()
            })
            .collect();

        let drawn: Vec<(f64, f64)> = Category::LEGEND_ORDER
            .into_iter()
            .flat_map(|c| category_points(&orders, c))
            .collect();
        assert_eq!(drawn.len(), orders.len());
        assert_eq!(drawn.iter().filter(|(s, p)| *s > 1000.0 && *p < 0.0).count(), 5);
    }

    #[test]
    fn bar_axis_has_one_segment_per_bar() {
        assert_eq!(bar_axis(3), 0..2);
        assert_eq!(bar_axis(5), 0..4);
        assert_eq!(bar_axis(1), 0..1);
    }
}
