//! Superstore Insights - Sales & Profit Analysis
//!
//! Loads a Superstore order export, cleans it, derives per-order fields and
//! aggregates sales, profit and margin by category, segment, month and
//! discount level. Static charts, an executive report and an interactive
//! dashboard are built on top of those summaries.

pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod gui;
pub mod pipeline;
pub mod report;
pub mod stats;
