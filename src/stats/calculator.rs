//! Statistics Calculator Module
//! Headline KPIs, margin distribution and order-level insights.

use crate::data::EnrichedOrder;
use crate::stats::aggregate::AggregateError;
use statrs::statistics::{Data, Distribution, Max, Min};
use std::cmp::Ordering;

/// Headline figures for a collection of orders.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub order_count: usize,
    pub total_sales: f64,
    pub total_profit: f64,
    /// Summed profit over summed sales.
    pub overall_margin: f64,
    /// Mean of per-order margins.
    pub mean_margin: f64,
    pub average_order_value: f64,
    pub loss_orders: usize,
    pub loss_order_pct: f64,
}

/// Descriptive statistics of per-order profit margin.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// One histogram bin; `upper` is exclusive except for the last bin.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Handles order-level statistics.
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn kpis(orders: &[EnrichedOrder]) -> Result<Kpis, AggregateError> {
        if orders.is_empty() {
            return Err(AggregateError::EmptyGroup);
        }

        let n = orders.len() as f64;
        let total_sales: f64 = orders.iter().map(|o| o.record.sales_clean).sum();
        let total_profit: f64 = orders.iter().map(|o| o.record.profit_clean).sum();
        let margin_sum: f64 = orders.iter().map(|o| o.profit_margin).sum();
        let loss_orders = orders.iter().filter(|o| o.is_loss()).count();

        Ok(Kpis {
            order_count: orders.len(),
            total_sales,
            total_profit,
            overall_margin: total_profit / total_sales * 100.0,
            mean_margin: margin_sum / n,
            average_order_value: total_sales / n,
            loss_orders,
            loss_order_pct: loss_orders as f64 / n * 100.0,
        })
    }

    /// Summary of the per-order margin distribution (sample std, linear percentiles).
    pub fn margin_summary(orders: &[EnrichedOrder]) -> Result<MarginSummary, AggregateError> {
        if orders.is_empty() {
            return Err(AggregateError::EmptyGroup);
        }

        let values: Vec<f64> = orders.iter().map(|o| o.profit_margin).collect();
        let count = values.len();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let data = Data::new(values);
        let std = if count > 1 {
            data.std_dev().unwrap_or(f64::NAN)
        } else {
            f64::NAN
        };

        Ok(MarginSummary {
            count,
            mean: data.mean().unwrap_or(f64::NAN),
            std,
            min: data.min(),
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: data.max(),
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Equal-width histogram of per-order margins over [min, max].
    pub fn margin_histogram(orders: &[EnrichedOrder], bins: usize) -> Vec<HistogramBin> {
        if orders.is_empty() || bins == 0 {
            return Vec::new();
        }

        let (lo, hi) = orders.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), o| {
            (lo.min(o.profit_margin), hi.max(o.profit_margin))
        });
        if hi <= lo {
            return vec![HistogramBin {
                lower: lo,
                upper: hi,
                count: orders.len(),
            }];
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for o in orders {
            let idx = (((o.profit_margin - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + i as f64 * width,
                upper: lo + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    /// Orders with sales above `sales_threshold` that still lost money.
    pub fn discount_disasters(orders: &[EnrichedOrder], sales_threshold: f64) -> Vec<&EnrichedOrder> {
        orders
            .iter()
            .filter(|o| o.is_discount_disaster(sales_threshold))
            .collect()
    }

    /// Orders whose margin exceeds `margin_threshold` percent.
    pub fn gold_mines(orders: &[EnrichedOrder], margin_threshold: f64) -> Vec<&EnrichedOrder> {
        orders
            .iter()
            .filter(|o| o.profit_margin > margin_threshold)
            .collect()
    }

    /// The `n` most profitable orders, largest profit first.
    pub fn top_profitable(orders: &[EnrichedOrder], n: usize) -> Vec<&EnrichedOrder> {
        let mut ranked: Vec<&EnrichedOrder> = orders.iter().collect();
        ranked.sort_by(|a, b| b.record.profit_clean.total_cmp(&a.record.profit_clean));
        ranked.truncate(n);
        ranked
    }

    /// The `n` biggest losses, most negative profit first.
    pub fn biggest_losses(orders: &[EnrichedOrder], n: usize) -> Vec<&EnrichedOrder> {
        let mut ranked: Vec<&EnrichedOrder> = orders.iter().collect();
        ranked.sort_by(|a, b| a.record.profit_clean.total_cmp(&b.record.profit_clean));
        ranked.truncate(n);
        ranked
    }

    /// Order with the lowest margin.
    pub fn worst_margin(orders: &[EnrichedOrder]) -> Option<&EnrichedOrder> {
        orders
            .iter()
            .min_by(|a, b| a.profit_margin.total_cmp(&b.profit_margin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Category, DataProcessor, OrderRecord, Segment};
    use chrono::NaiveDate;

    fn order(name: &str, sales: f64, profit: f64) -> EnrichedOrder {
        DataProcessor::derive(OrderRecord {
            source_row: 0,
            order_date: NaiveDate::from_ymd_opt(2012, 6, 1).unwrap(),
            ship_date: NaiveDate::from_ymd_opt(2012, 6, 3).unwrap(),
            category: Category::Technology,
            segment: Segment::Consumer,
            region: "North".to_string(),
            market: "LATAM".to_string(),
            country: "Mexico".to_string(),
            product_name: name.to_string(),
            sales_clean: sales,
            profit_clean: profit,
            discount_clean: 0.0,
        })
        .unwrap()
    }

    fn sample() -> Vec<EnrichedOrder> {
        vec![
            order("Phone", 1200.0, 300.0),
            order("Copier", 1800.0, -400.0),
            order("Desk", 500.0, 100.0),
            order("Pen", 10.0, 6.0),
        ]
    }

    #[test]
    fn kpis_keep_both_margin_definitions() {
        let k = StatsCalculator::kpis(&sample()).unwrap();

        assert_eq!(k.order_count, 4);
        assert_eq!(k.total_sales, 3510.0);
        assert_eq!(k.total_profit, 6.0);
        assert!((k.overall_margin - 6.0 / 3510.0 * 100.0).abs() < 1e-9);
        let mean = (25.0 + (-400.0 / 1800.0 * 100.0) + 20.0 + 60.0) / 4.0;
        assert!((k.mean_margin - mean).abs() < 1e-9);
        assert_eq!(k.loss_orders, 1);
        assert!((k.loss_order_pct - 25.0).abs() < 1e-9);
        assert!((k.average_order_value - 877.5).abs() < 1e-9);
    }

    #[test]
    fn kpis_on_empty_collection_fail() {
        assert_eq!(StatsCalculator::kpis(&[]), Err(AggregateError::EmptyGroup));
    }

    #[test]
    fn margin_summary_matches_linear_percentiles() {
        let orders = vec![
            order("a", 100.0, 10.0),
            order("b", 100.0, 20.0),
            order("c", 100.0, 30.0),
            order("d", 100.0, 40.0),
        ];
        let s = StatsCalculator::margin_summary(&orders).unwrap();

        assert_eq!(s.count, 4);
        assert!((s.mean - 25.0).abs() < 1e-9);
        assert!((s.median - 25.0).abs() < 1e-9);
        assert!((s.p25 - 17.5).abs() < 1e-9);
        assert!((s.p75 - 32.5).abs() < 1e-9);
        assert!((s.min - 10.0).abs() < 1e-9);
        assert!((s.max - 40.0).abs() < 1e-9);
        // sample standard deviation of 10, 20, 30, 40
        assert!((s.std - 12.909_944_487_358_056).abs() < 1e-9);
    }

    #[test]
    fn disasters_and_gold_mines() {
        let orders = sample();
        let disasters = StatsCalculator::discount_disasters(&orders, 1000.0);
        assert_eq!(disasters.len(), 1);
        assert_eq!(disasters[0].record.product_name, "Copier");

        let gold = StatsCalculator::gold_mines(&orders, 50.0);
        assert_eq!(gold.len(), 1);
        assert_eq!(gold[0].record.product_name, "Pen");
    }

    #[test]
    fn top_and_bottom_products() {
        let orders = sample();
        let top: Vec<_> = StatsCalculator::top_profitable(&orders, 2)
            .iter()
            .map(|o| o.record.product_name.as_str())
            .collect();
        assert_eq!(top, vec!["Phone", "Desk"]);

        let bottom = StatsCalculator::biggest_losses(&orders, 10);
        assert_eq!(bottom.len(), 4);
        assert_eq!(bottom[0].record.product_name, "Copier");
        assert_eq!(
            StatsCalculator::worst_margin(&orders).map(|o| o.record.product_name.as_str()),
            Some("Copier")
        );
    }

    #[test]
    fn histogram_counts_every_order() {
        let orders = sample();
        let bins = StatsCalculator::margin_histogram(&orders, 5);

        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), orders.len());
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[4].count, 1);
    }
}
