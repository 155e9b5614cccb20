//! CSV Data Loader Module
//! Handles CSV file loading with Polars and cleaning rows into typed order records.

use crate::data::parse::{parse_date, parse_number};
use crate::data::record::{Category, OrderRecord, Segment};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Columns that must be present in the input file.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "order_date",
    "ship_date",
    "sales",
    "profit",
    "discount",
    "category",
    "segment",
    "region",
    "market",
    "country",
    "product_name",
];

/// Row numbers in errors are 1-based data rows (the header is not counted).
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
    #[error("Required column '{column}' is missing")]
    MissingColumn { column: String },
    #[error("Row {row}: cannot parse {column} date '{value}'")]
    DateParse {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row}: {column} value '{value}' is not numeric")]
    NumericParse {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row}: unknown category '{value}'")]
    UnknownCategory { row: usize, value: String },
    #[error("Row {row}: unknown segment '{value}'")]
    UnknownSegment { row: usize, value: String },
}

/// What the cleaning pass did to the raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub total_rows: usize,
    /// Rows removed because `sales_clean <= 0` (invalid orders in the feed).
    pub dropped_non_positive_sales: usize,
    pub kept_rows: usize,
}

/// Cleaned records plus the summary of the cleaning pass.
#[derive(Debug, Clone)]
pub struct CleanedOrders {
    pub orders: Vec<OrderRecord>,
    pub summary: LoadSummary,
}

/// Read a CSV file with every column kept as text.
///
/// Numeric columns in the feed carry thousands separators, so type inference
/// is disabled and normalization happens in [`clean_orders`].
pub fn read_csv(file_path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
    let df = LazyCsvReader::new(file_path.as_ref())
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;
    Ok(df)
}

/// Handles CSV file loading with Polars and keeps the raw table for export.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<&DataFrame, LoaderError> {
        let file_path = file_path.as_ref();
        self.file_path = Some(file_path.to_path_buf());

        let df = read_csv(file_path)?;
        info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Parse and clean the loaded table into order records.
    pub fn clean(&self) -> Result<CleanedOrders, LoaderError> {
        let df = self.df.as_ref().ok_or(LoaderError::NoData)?;
        clean_orders(df)
    }

    /// Get unique values from a column, sorted.
    pub fn get_unique_values(&self, column: &str) -> Vec<String> {
        let Some(df) = &self.df else {
            return Vec::new();
        };

        text_column(df, column)
            .map(|values| {
                let mut unique: Vec<String> = values
                    .into_iter()
                    .flatten()
                    .collect::<std::collections::BTreeSet<_>>()
                    .into_iter()
                    .collect();
                unique.retain(|v| !v.is_empty());
                unique
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

/// Extract a column as optional strings, casting non-text columns.
fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    let column = df.column(name).map_err(|_| LoaderError::MissingColumn {
        column: name.to_string(),
    })?;
    let column = column.cast(&DataType::String)?;
    let values = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

struct RawColumns {
    order_date: Vec<Option<String>>,
    ship_date: Vec<Option<String>>,
    sales: Vec<Option<String>>,
    profit: Vec<Option<String>>,
    discount: Vec<Option<String>>,
    category: Vec<Option<String>>,
    segment: Vec<Option<String>>,
    region: Vec<Option<String>>,
    market: Vec<Option<String>>,
    country: Vec<Option<String>>,
    product_name: Vec<Option<String>>,
}

impl RawColumns {
    /// Fields are read in `REQUIRED_COLUMNS` order, so the first missing one is reported.
    fn extract(df: &DataFrame) -> Result<Self, LoaderError> {
        Ok(Self {
            order_date: text_column(df, "order_date")?,
            ship_date: text_column(df, "ship_date")?,
            sales: text_column(df, "sales")?,
            profit: text_column(df, "profit")?,
            discount: text_column(df, "discount")?,
            category: text_column(df, "category")?,
            segment: text_column(df, "segment")?,
            region: text_column(df, "region")?,
            market: text_column(df, "market")?,
            country: text_column(df, "country")?,
            product_name: text_column(df, "product_name")?,
        })
    }
}

fn cell(values: &[Option<String>], i: usize) -> &str {
    values.get(i).and_then(|v| v.as_deref()).unwrap_or("")
}

fn date_cell(values: &[Option<String>], i: usize, column: &str) -> Result<chrono::NaiveDate, LoaderError> {
    let raw = cell(values, i);
    parse_date(raw).ok_or_else(|| LoaderError::DateParse {
        row: i + 1,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

fn number_cell(values: &[Option<String>], i: usize, column: &str) -> Result<f64, LoaderError> {
    let raw = cell(values, i);
    parse_number(raw).ok_or_else(|| LoaderError::NumericParse {
        row: i + 1,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Parse dates, normalize numeric text and drop rows with non-positive sales.
///
/// Any unparseable field fails the whole load; nothing is defaulted.
pub fn clean_orders(df: &DataFrame) -> Result<CleanedOrders, LoaderError> {
    let raw = RawColumns::extract(df)?;
    let total_rows = df.height();
    let mut orders = Vec::with_capacity(total_rows);
    let mut dropped = 0usize;

    for i in 0..total_rows {
        let sales_clean = number_cell(&raw.sales, i, "sales")?;
        // Non-positive sales rows are discarded before their other fields are read.
        if sales_clean <= 0.0 {
            dropped += 1;
            continue;
        }
        let profit_clean = number_cell(&raw.profit, i, "profit")?;
        let discount_clean = number_cell(&raw.discount, i, "discount")?;
        let order_date = date_cell(&raw.order_date, i, "order_date")?;
        let ship_date = date_cell(&raw.ship_date, i, "ship_date")?;

        let category_raw = cell(&raw.category, i);
        let category = Category::parse(category_raw).ok_or_else(|| LoaderError::UnknownCategory {
            row: i + 1,
            value: category_raw.to_string(),
        })?;
        let segment_raw = cell(&raw.segment, i);
        let segment = Segment::parse(segment_raw).ok_or_else(|| LoaderError::UnknownSegment {
            row: i + 1,
            value: segment_raw.to_string(),
        })?;

        orders.push(OrderRecord {
            source_row: i,
            order_date,
            ship_date,
            category,
            segment,
            region: cell(&raw.region, i).to_string(),
            market: cell(&raw.market, i).to_string(),
            country: cell(&raw.country, i).to_string(),
            product_name: cell(&raw.product_name, i).to_string(),
            sales_clean,
            profit_clean,
            discount_clean,
        });
    }

    if dropped > 0 {
        info!("Dropped {} orders with sales <= 0", dropped);
    }
    debug!("Cleaned {} of {} rows", orders.len(), total_rows);

    let summary = LoadSummary {
        total_rows,
        dropped_non_positive_sales: dropped,
        kept_rows: orders.len(),
    };
    Ok(CleanedOrders { orders, summary })
}
