//! Stats module - Grouped aggregation and order-level statistics

pub mod aggregate;
mod calculator;

pub use aggregate::{aggregate, sales_shares, AggregateError, AggregateRow, GroupKey, KeyValue, RowOrder};
pub use calculator::{HistogramBin, Kpis, MarginSummary, StatsCalculator};
