//! Superstore Insights - command line entry point.

use clap::Parser;
use superstore_insights::cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    run(cli)
}
