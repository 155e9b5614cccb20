//! Charts module - Static PNG charts and interactive dashboard plots

mod plotter;
mod renderer;

pub use plotter::{color32, ChartPlotter};
pub use renderer::{
    RenderError, StaticChartRenderer, CATEGORY_MARGIN, CATEGORY_PIE, DISCOUNT_MARGIN, MONTHLY_TREND,
    SALES_PROFIT_SCATTER, SEGMENT_MARGIN, SEGMENT_PIE,
};

use crate::config::{Palette, Rgb};
use crate::data::EnrichedOrder;
use crate::stats::KeyValue;

/// Palette color for a grouping key; keys without a fixed color use the neutral tone.
pub fn key_color(palette: &Palette, key: &KeyValue) -> Rgb {
    match key {
        KeyValue::Category(c) => palette.category(*c),
        KeyValue::Segment(s) => palette.segment(*s),
        KeyValue::DiscountBucket(b) => palette.discount(*b),
        _ => palette.neutral,
    }
}

/// At most `limit` items, evenly spaced across `items` in their original order.
pub(crate) fn sample_evenly<T>(items: &[T], limit: usize) -> Vec<&T> {
    if limit == 0 {
        return Vec::new();
    }
    if items.len() <= limit {
        return items.iter().collect();
    }
    let step = items.len() as f64 / limit as f64;
    (0..limit)
        .map(|i| &items[((i as f64 * step) as usize).min(items.len() - 1)])
        .collect()
}

/// Scatter points for the dashboard: every discount disaster plus an even
/// sample of the other orders, filling up to `limit`.
pub(crate) fn scatter_sample(orders: &[EnrichedOrder], limit: usize, sales_threshold: f64) -> Vec<&EnrichedOrder> {
    let (disasters, rest): (Vec<&EnrichedOrder>, Vec<&EnrichedOrder>) = orders
        .iter()
        .partition(|o| o.is_discount_disaster(sales_threshold));
    let room = limit.saturating_sub(disasters.len());
    let mut sample: Vec<&EnrichedOrder> = sample_evenly(&rest, room).into_iter().copied().collect();
    sample.extend(disasters);
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Category, DataProcessor, OrderRecord, Segment};
    use chrono::NaiveDate;

    fn order(sales: f64, profit: f64) -> EnrichedOrder {
        DataProcessor::derive(OrderRecord {
            source_row: 0,
            order_date: NaiveDate::from_ymd_opt(2014, 6, 1).unwrap(),
            ship_date: NaiveDate::from_ymd_opt(2014, 6, 3).unwrap(),
            category: Category::Furniture,
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
    }

    #[test]
    fn dashboard_scatter_keeps_every_disaster() {
        let orders: Vec<EnrichedOrder> = (0..2000)
            .map(|i| if i % 400 == 7 { order(2500.0, -800.0) } else { order(100.0, 10.0) })
            .collect();

        let sample = scatter_sample(&orders, 500, 1000.0);
        assert_eq!(sample.len(), 500);
        assert_eq!(sample.iter().filter(|o| o.is_discount_disaster(1000.0)).count(), 5);

        let tight = scatter_sample(&orders, 3, 1000.0);
        assert_eq!(tight.len(), 5);
        assert!(tight.iter().all(|o| o.is_discount_disaster(1000.0)));
    }

    #[test]
    fn sampling_keeps_order_and_limit() {
        let items: Vec<usize> = (0..1000).collect();
        let sample = sample_evenly(&items, 10);
        assert_eq!(sample.len(), 10);
        assert_eq!(*sample[0], 0);
        assert_eq!(*sample[1], 100);
        assert!(sample.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(sample_evenly(&items[..5], 10).len(), 5);
        assert!(sample_evenly(&items, 0).is_empty());
    }

    #[test]
    fn keys_map_to_palette_colors() {
        let palette = Palette::default();
        assert_eq!(
            key_color(&palette, &KeyValue::Category(Category::Furniture)),
            palette.category(Category::Furniture)
        );
        assert_eq!(
            key_color(&palette, &KeyValue::Segment(Segment::Corporate)),
            palette.segment(Segment::Corporate)
        );
        assert_eq!(key_color(&palette, &KeyValue::Text("West".into())), palette.neutral);
    }
}
