//! CSV Export Module
//! Writes a filtered subset of orders in the same column shape as the input file.

use crate::data::record::EnrichedOrder;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Select the source rows behind `orders`, keeping every original column and value.
pub fn select_source_rows(
    source: &DataFrame,
    orders: &[EnrichedOrder],
) -> Result<DataFrame, ExportError> {
    let indices: Vec<IdxSize> = orders
        .iter()
        .map(|o| o.record.source_row as IdxSize)
        .collect();
    let idx = IdxCa::from_vec("row".into(), indices);
    Ok(source.take(&idx)?)
}

/// Write the source rows behind `orders` to `path`. Returns the number of rows written.
pub fn write_filtered_csv(
    source: &DataFrame,
    orders: &[EnrichedOrder],
    path: &Path,
) -> Result<usize, ExportError> {
    let mut subset = select_source_rows(source, orders)?;
    let mut file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut subset)?;

    info!("Exported {} rows to {}", subset.height(), path.display());
    Ok(subset.height())
}

/// Default export file name, e.g. `sales_filtered_2011-01-01_2014-12-31.csv`.
pub fn export_file_name(start: chrono::NaiveDate, end: chrono::NaiveDate) -> String {
    format!("sales_filtered_{}_{}.csv", start, end)
}
