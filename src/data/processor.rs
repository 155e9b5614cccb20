//! Data Processor Module
//! Computes per-order derived fields (margin, time buckets, discount bucket).

use crate::data::record::{DiscountBucket, EnrichedOrder, OrderRecord, YearMonth};
use chrono::{Datelike, Month};
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq)]
pub enum ProcessorError {
    #[error("Row {row}: discount {value} is outside [0, 1]")]
    DiscountRange { row: usize, value: f64 },
    #[error("Row {row}: profit margin is undefined for sales {sales}")]
    UndefinedMargin { row: usize, sales: f64 },
}

/// Profit as a percentage of sales.
pub fn profit_margin(profit: f64, sales: f64) -> f64 {
    profit / sales * 100.0
}

/// Handles derived-field computation for cleaned records.
pub struct DataProcessor;

impl DataProcessor {
    /// Derive the computed fields of a single record.
    pub fn derive(record: OrderRecord) -> Result<EnrichedOrder, ProcessorError> {
        let row = record.source_row + 1;
        if !(record.sales_clean > 0.0) {
            return Err(ProcessorError::UndefinedMargin {
                row,
                sales: record.sales_clean,
            });
        }

        let discount_bucket =
            DiscountBucket::from_rate(record.discount_clean).ok_or(ProcessorError::DiscountRange {
                row,
                value: record.discount_clean,
            })?;

        let month = record.order_date.month();
        let month_name = Month::try_from(month as u8)
            .map(|m| m.name())
            .unwrap_or_default();

        Ok(EnrichedOrder {
            profit_margin: profit_margin(record.profit_clean, record.sales_clean),
            month,
            month_name,
            year_month: YearMonth::from_date(record.order_date),
            discount_bucket,
            record,
        })
    }

    /// Derive all records in parallel. Output order matches input order.
    pub fn derive_all(records: Vec<OrderRecord>) -> Result<Vec<EnrichedOrder>, ProcessorError> {
        let count = records.len();
        let orders = records
            .into_par_iter()
            .map(Self::derive)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Derived fields for {} orders", count);
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{Category, Segment};
    use chrono::NaiveDate;

    fn record(sales: f64, profit: f64, discount: f64) -> OrderRecord {
        OrderRecord {
            source_row: 0,
            order_date: NaiveDate::from_ymd_opt(2013, 3, 5).unwrap(),
            ship_date: NaiveDate::from_ymd_opt(2013, 3, 9).unwrap(),
            category: Category::Furniture,
            segment: Segment::Corporate,
            region: "Oceania".to_string(),
            market: "APAC".to_string(),
            country: "Australia".to_string(),
            product_name: "Chair".to_string(),
            sales_clean: sales,
            profit_clean: profit,
            discount_clean: discount,
        }
    }

    #[test]
    fn margin_and_time_fields() {
        let order = DataProcessor::derive(record(800.0, -50.0, 0.2)).unwrap();

        assert!((order.profit_margin - (-50.0 / 800.0 * 100.0)).abs() < 1e-9);
        assert_eq!(order.month, 3);
        assert_eq!(order.month_name, "March");
        assert_eq!(order.year_month, YearMonth { year: 2013, month: 3 });
        assert_eq!(order.discount_bucket, DiscountBucket::From20To30);
    }

    #[test]
    fn discount_out_of_range_is_an_error() {
        assert_eq!(
            DataProcessor::derive(record(10.0, 1.0, 1.5)),
            Err(ProcessorError::DiscountRange { row: 1, value: 1.5 })
        );
    }

    #[test]
    fn zero_sales_never_produce_a_margin() {
        assert!(matches!(
            DataProcessor::derive(record(0.0, 1.0, 0.0)),
            Err(ProcessorError::UndefinedMargin { .. })
        ));
    }

    #[test]
    fn parallel_derivation_keeps_input_order() {
        let records: Vec<_> = (0..500)
            .map(|i| {
                let mut r = record(1.0 + i as f64, i as f64, 0.0);
                r.source_row = i;
                r
            })
            .collect();
        let orders = DataProcessor::derive_all(records).unwrap();

        assert!(orders
            .iter()
            .enumerate()
            .all(|(i, o)| o.record.source_row == i));
        for o in &orders {
            let expected = o.record.profit_clean / o.record.sales_clean * 100.0;
            assert!((o.profit_margin - expected).abs() < 1e-9);
        }
    }
}
