//! Command line interface: batch analysis, filtered export and the dashboard.

use crate::charts::StaticChartRenderer;
use crate::config::{AnalysisConfig, Palette};
use crate::data::export::export_file_name;
use crate::data::parse::parse_date;
use crate::data::{write_filtered_csv, Category, FilterDomain, OrderFilter, Segment};
use crate::pipeline::{self, Insights};
use crate::report::{executive_summary, write_report};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "superstore",
    version,
    about = "Sales and profit analysis over a Superstore order export"
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// JSON file overriding analysis thresholds and chart settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize the dataset, render the static charts and write the executive report
    Analyze {
        /// Input CSV file
        input: PathBuf,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip chart rendering
        #[arg(long)]
        no_charts: bool,

        /// Open the output directory when done
        #[arg(long)]
        open: bool,
    },
    /// Write the orders matching the filters, in the input's column layout
    Export {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file (defaults to sales_filtered_<start>_<end>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First order date to keep
        #[arg(long)]
        start: Option<String>,

        /// Last order date to keep
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        segment: Option<String>,

        /// Region to keep; repeat for several
        #[arg(long)]
        region: Vec<String>,

        #[arg(long)]
        min_sales: Option<f64>,

        #[arg(long)]
        max_sales: Option<f64>,
    },
    /// Launch the interactive dashboard
    Dashboard {
        /// CSV file to load on start
        input: Option<PathBuf>,
    },
}

pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => Ok(AnalysisConfig::from_json_file(path)?),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Filter from the `export` flags. Dates use the same formats as the input file.
pub fn build_filter(
    start: Option<&str>,
    end: Option<&str>,
    category: Option<&str>,
    segment: Option<&str>,
    regions: &[String],
    min_sales: Option<f64>,
    max_sales: Option<f64>,
) -> Result<OrderFilter> {
    let date = |value: Option<&str>, flag: &str| -> Result<_> {
        value
            .map(|v| parse_date(v).ok_or_else(|| anyhow!("Invalid --{flag} date: {v}")))
            .transpose()
    };

    let filter = OrderFilter {
        start: date(start, "start")?,
        end: date(end, "end")?,
        category: category
            .map(|c| Category::parse(c).ok_or_else(|| anyhow!("Unknown category: {c}")))
            .transpose()?,
        segment: segment
            .map(|s| Segment::parse(s).ok_or_else(|| anyhow!("Unknown segment: {s}")))
            .transpose()?,
        regions: regions.to_vec(),
        min_sales,
        max_sales,
    };

    if let (Some(s), Some(e)) = (filter.start, filter.end) {
        if s > e {
            bail!("--start {s} is after --end {e}");
        }
    }
    Ok(filter)
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Analyze {
            input,
            output,
            no_charts,
            open: open_dir,
        } => {
            if let Some(output) = output {
                config.output_dir = output;
            }
            analyze(&input, &config, no_charts, open_dir)
        }
        Command::Export {
            input,
            output,
            start,
            end,
            category,
            segment,
            region,
            min_sales,
            max_sales,
        } => {
            let filter = build_filter(
                start.as_deref(),
                end.as_deref(),
                category.as_deref(),
                segment.as_deref(),
                &region,
                min_sales,
                max_sales,
            )?;
            export(&input, output, &filter)
        }
        Command::Dashboard { input } => crate::gui::run_dashboard(config, input)
            .map_err(|e| anyhow!("Dashboard failed: {e}")),
    }
}

fn analyze(input: &Path, config: &AnalysisConfig, no_charts: bool, open_dir: bool) -> Result<()> {
    let prepared = pipeline::load(input).with_context(|| format!("Failed to analyze {}", input.display()))?;
    let insights = Insights::compute(&prepared.orders, config)?;

    let k = &insights.kpis;
    info!(
        "{} orders, sales ${:.0}, profit ${:.0}, overall margin {:.1}%, mean order margin {:.1}%",
        k.order_count, k.total_sales, k.total_profit, k.overall_margin, k.mean_margin
    );

    let files = if no_charts {
        Vec::new()
    } else {
        let palette = Palette::default();
        StaticChartRenderer::new(config, &palette, &config.output_dir)
            .render_all(&prepared.orders, &insights)?
    };

    let text = executive_summary(&insights, chrono::Local::now().naive_local(), &files);
    let report_path = write_report(&config.output_dir, &text)
        .with_context(|| format!("Failed to write report to {}", config.output_dir.display()))?;
    println!("{text}");
    info!("Report saved to {}", report_path.display());

    if open_dir {
        open::that(&config.output_dir)
            .with_context(|| format!("Failed to open {}", config.output_dir.display()))?;
    }
    Ok(())
}

fn export(input: &Path, output: Option<PathBuf>, filter: &OrderFilter) -> Result<()> {
    let prepared = pipeline::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
    let selected = filter.apply(&prepared.orders);
    if selected.is_empty() {
        bail!("No orders match the given filters");
    }

    let output = match output {
        Some(path) => path,
        None => {
            let domain = FilterDomain::from_orders(&selected)
                .ok_or_else(|| anyhow!("No orders match the given filters"))?;
            PathBuf::from(export_file_name(domain.first_date, domain.last_date))
        }
    };

    let rows = write_filtered_csv(&prepared.source, &selected, &output)?;
    println!("Exported {rows} of {} orders to {}", prepared.orders.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_export_flags() {
        let cli = Cli::try_parse_from([
            "superstore",
            "export",
            "orders.csv",
            "--start",
            "05/03/2013",
            "--region",
            "East",
            "--region",
            "West",
        ])
        .unwrap();

        match cli.command {
            Command::Export {
                input, start, region, ..
            } => {
                assert_eq!(input, PathBuf::from("orders.csv"));
                assert_eq!(start.as_deref(), Some("05/03/2013"));
                assert_eq!(region, vec!["East".to_string(), "West".to_string()]);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "superstore",
            "analyze",
            "orders.csv",
            "--no-charts",
            "--log-level",
            "debug",
            "--config",
            "settings.json",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.config, Some(PathBuf::from("settings.json")));
        assert!(matches!(cli.command, Command::Analyze { no_charts: true, .. }));
    }

    #[test]
    fn filter_flags_are_validated() {
        let filter = build_filter(
            Some("2013-03-05"),
            Some("31/12/2013"),
            Some("Office Supplies"),
            None,
            &[],
            Some(10.0),
            None,
        )
        .unwrap();
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2013, 3, 5));
        assert_eq!(filter.end, NaiveDate::from_ymd_opt(2013, 12, 31));
        assert_eq!(filter.category, Some(Category::OfficeSupplies));
        assert_eq!(filter.min_sales, Some(10.0));

        assert!(build_filter(None, None, Some("Toys"), None, &[], None, None).is_err());
        assert!(build_filter(Some("yesterday"), None, None, None, &[], None, None).is_err());
        assert!(build_filter(Some("2014-01-01"), Some("2013-01-01"), None, None, &[], None, None).is_err());
    }
}
