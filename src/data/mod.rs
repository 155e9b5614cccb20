//! Data module - CSV loading, cleaning, derived fields, filtering and export

pub mod export;
pub mod filter;
pub mod loader;
pub mod parse;
pub mod processor;
pub mod record;

pub use export::{write_filtered_csv, ExportError};
pub use filter::{FilterDomain, OrderFilter};
pub use loader::{clean_orders, read_csv, CleanedOrders, DataLoader, LoadSummary, LoaderError};
pub use processor::{profit_margin, DataProcessor, ProcessorError};
pub use record::{Category, DiscountBucket, EnrichedOrder, OrderRecord, Segment, YearMonth};
