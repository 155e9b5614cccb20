//! Order Filter Module
//! Narrows the in-memory order collection before re-aggregation.

use crate::data::record::{Category, EnrichedOrder, Segment};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Dashboard/export filter. `None` and empty fields match everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderFilter {
    /// Inclusive lower bound on order date.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound on order date.
    pub end: Option<NaiveDate>,
    pub category: Option<Category>,
    pub segment: Option<Segment>,
    /// Multi-select; empty means all regions.
    pub regions: Vec<String>,
    pub min_sales: Option<f64>,
    pub max_sales: Option<f64>,
}

impl OrderFilter {
    pub fn matches(&self, order: &EnrichedOrder) -> bool {
        let record = &order.record;

        self.start.map_or(true, |start| record.order_date >= start)
            && self.end.map_or(true, |end| record.order_date <= end)
            && self.category.map_or(true, |c| record.category == c)
            && self.segment.map_or(true, |s| record.segment == s)
            && (self.regions.is_empty() || self.regions.iter().any(|r| *r == record.region))
            && self.min_sales.map_or(true, |min| record.sales_clean >= min)
            && self.max_sales.map_or(true, |max| record.sales_clean <= max)
    }

    /// Matching orders, in input order.
    pub fn apply(&self, orders: &[EnrichedOrder]) -> Vec<EnrichedOrder> {
        orders.iter().filter(|o| self.matches(o)).cloned().collect()
    }
}

/// Bounds of the loaded data, used to seed filter controls.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDomain {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub min_sales: f64,
    pub max_sales: f64,
    pub regions: Vec<String>,
}

impl FilterDomain {
    /// `None` for an empty collection.
    pub fn from_orders(orders: &[EnrichedOrder]) -> Option<Self> {
        let first = orders.first()?;
        let mut domain = Self {
            first_date: first.record.order_date,
            last_date: first.record.order_date,
            min_sales: first.record.sales_clean,
            max_sales: first.record.sales_clean,
            regions: Vec::new(),
        };
        let mut regions = BTreeSet::new();

        for order in orders {
            let r = &order.record;
            domain.first_date = domain.first_date.min(r.order_date);
            domain.last_date = domain.last_date.max(r.order_date);
            domain.min_sales = domain.min_sales.min(r.sales_clean);
            domain.max_sales = domain.max_sales.max(r.sales_clean);
            regions.insert(r.region.clone());
        }

        domain.regions = regions.into_iter().collect();
        Some(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::processor::DataProcessor;
    use crate::data::record::OrderRecord;

    fn order(day: u32, category: Category, region: &str, sales: f64) -> EnrichedOrder {
        DataProcessor::derive(OrderRecord {
            source_row: day as usize,
            order_date: NaiveDate::from_ymd_opt(2014, 1, day).unwrap(),
            ship_date: NaiveDate::from_ymd_opt(2014, 2, 1).unwrap(),
            category,
            segment: Segment::Consumer,
            region: region.to_string(),
            market: "US".to_string(),
            country: "United States".to_string(),
            product_name: "Binder".to_string(),
            sales_clean: sales,
            profit_clean: 1.0,
            discount_clean: 0.0,
        })
        .unwrap()
    }

    fn sample() -> Vec<EnrichedOrder> {
        vec![
            order(1, Category::Technology, "East", 100.0),
            order(10, Category::Furniture, "West", 2500.0),
            order(20, Category::Technology, "West", 40.0),
        ]
    }

    #[test]
    fn default_filter_keeps_everything() {
        let orders = sample();
        assert_eq!(OrderFilter::default().apply(&orders), orders);
    }

    #[test]
    fn date_range_is_inclusive() {
        let filter = OrderFilter {
            start: NaiveDate::from_ymd_opt(2014, 1, 10),
            end: NaiveDate::from_ymd_opt(2014, 1, 20),
            ..Default::default()
        };
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].record.source_row, 10);
    }

    #[test]
    fn filters_combine() {
        let filter = OrderFilter {
            category: Some(Category::Technology),
            regions: vec!["West".to_string()],
            min_sales: Some(10.0),
            max_sales: Some(50.0),
            ..Default::default()
        };
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].record.source_row, 20);
    }

    #[test]
    fn domain_covers_loaded_orders() {
        let domain = FilterDomain::from_orders(&sample()).unwrap();
        assert_eq!(domain.first_date, NaiveDate::from_ymd_opt(2014, 1, 1).unwrap());
        assert_eq!(domain.last_date, NaiveDate::from_ymd_opt(2014, 1, 20).unwrap());
        assert_eq!(domain.min_sales, 40.0);
        assert_eq!(domain.max_sales, 2500.0);
        assert_eq!(domain.regions, vec!["East".to_string(), "West".to_string()]);
        assert!(FilterDomain::from_orders(&[]).is_none());
    }
}
