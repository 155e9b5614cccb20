//! Analysis Pipeline
//! Loader -> cleaner -> derived fields -> grouped summaries, in one pass.

use crate::config::AnalysisConfig;
use crate::data::{
    clean_orders, read_csv, DataProcessor, EnrichedOrder, LoadSummary, LoaderError, ProcessorError,
};
use crate::stats::{
    aggregate, AggregateError, AggregateRow, GroupKey, Kpis, MarginSummary, RowOrder,
    StatsCalculator,
};
use polars::prelude::DataFrame;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// The raw table plus the cleaned, enriched orders drawn from it.
pub struct PreparedData {
    /// Source table, kept for exports in the input's shape.
    pub source: DataFrame,
    pub orders: Vec<EnrichedOrder>,
    pub summary: LoadSummary,
}

/// Clean and enrich an already loaded table.
pub fn prepare(source: DataFrame) -> Result<PreparedData, PipelineError> {
    let cleaned = clean_orders(&source)?;
    let orders = DataProcessor::derive_all(cleaned.orders)?;
    Ok(PreparedData {
        source,
        orders,
        summary: cleaned.summary,
    })
}

/// Load a CSV file, clean it and derive per-order fields.
pub fn load(path: &Path) -> Result<PreparedData, PipelineError> {
    info!("Loading dataset from {}", path.display());
    let source = read_csv(path)?;
    let prepared = prepare(source)?;
    info!(
        "Prepared {} orders ({} dropped for sales <= 0)",
        prepared.orders.len(),
        prepared.summary.dropped_non_positive_sales
    );
    Ok(prepared)
}

/// Every summary the report, charts and dashboard draw from.
#[derive(Debug, Clone)]
pub struct Insights {
    pub kpis: Kpis,
    /// Ranked by summed sales.
    pub by_category: Vec<AggregateRow>,
    /// Ranked by summed sales.
    pub by_segment: Vec<AggregateRow>,
    /// Chronological.
    pub monthly: Vec<AggregateRow>,
    /// Legend order (Technology, Office Supplies, Furniture).
    pub category_margin: Vec<AggregateRow>,
    /// Ranked by mean margin.
    pub segment_margin: Vec<AggregateRow>,
    /// Ordinal bucket order.
    pub by_discount: Vec<AggregateRow>,
    pub margin: MarginSummary,
    pub disaster_count: usize,
    /// Summed (negative) profit of the discount disasters.
    pub disaster_loss: f64,
    pub gold_mine_count: usize,
    pub worst_order: Option<EnrichedOrder>,
}

impl Insights {
    pub fn compute(orders: &[EnrichedOrder], config: &AnalysisConfig) -> Result<Self, PipelineError> {
        let disasters = StatsCalculator::discount_disasters(orders, config.disaster_sales_threshold);

        Ok(Self {
            kpis: StatsCalculator::kpis(orders)?,
            by_category: aggregate(orders, &GroupKey::Category, &RowOrder::SalesDescending)?,
            by_segment: aggregate(orders, &GroupKey::Segment, &RowOrder::SalesDescending)?,
            monthly: aggregate(orders, &GroupKey::YearMonth, &RowOrder::KeyAscending)?,
            category_margin: aggregate(orders, &GroupKey::Category, &RowOrder::category_legend())?,
            segment_margin: aggregate(orders, &GroupKey::Segment, &RowOrder::MeanMarginDescending)?,
            by_discount: aggregate(orders, &GroupKey::DiscountBucket, &RowOrder::KeyAscending)?,
            margin: StatsCalculator::margin_summary(orders)?,
            disaster_count: disasters.len(),
            disaster_loss: disasters.iter().map(|o| o.record.profit_clean).sum(),
            gold_mine_count: StatsCalculator::gold_mines(orders, config.gold_mine_margin).len(),
            worst_order: StatsCalculator::worst_margin(orders).cloned(),
        })
    }

    /// Month with the highest summed sales.
    pub fn peak_month(&self) -> Option<&AggregateRow> {
        self.monthly
            .iter()
            .max_by(|a, b| a.sales_sum.total_cmp(&b.sales_sum))
    }
}
