//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data pipeline. Every dataset option can also be set from the
//! environment (or a `.env` file loaded at startup).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dash", version, about = "Synthetic sales dataset dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print dataset stats, the first rows, and the three aggregate tables.
    Summary(SummaryArgs),
    /// Write the dataset to CSV and the aggregates to JSON.
    Export(ExportArgs),
    /// Print the tables stored in an aggregates JSON written by `export`.
    Show(ShowArgs),
    /// Launch the interactive dashboard (default).
    Tui(DatasetArgs),
}

/// Options that determine the dataset.
#[derive(Debug, Args, Clone)]
pub struct DatasetArgs {
    /// Random seed for generation.
    #[arg(long, env = "SALES_DASH_SEED", default_value_t = crate::domain::DEFAULT_SEED)]
    pub seed: u64,

    /// Number of consecutive days to generate.
    #[arg(
        short = 'n',
        long,
        env = "SALES_DASH_ROWS",
        default_value_t = crate::domain::DEFAULT_ROW_COUNT,
        allow_negative_numbers = true
    )]
    pub rows: i64,

    /// First date of the series (YYYY-MM-DD).
    #[arg(long, env = "SALES_DASH_START", default_value = "2023-01-01")]
    pub start: NaiveDate,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Number of table rows to print.
    #[arg(long, default_value_t = 10)]
    pub head: usize,

    /// Append an ASCII chart of daily sales.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Output CSV for the full table.
    #[arg(long, value_name = "CSV", default_value = "sales.csv")]
    pub csv: PathBuf,

    /// Output JSON for the aggregates.
    #[arg(long, value_name = "JSON")]
    pub aggregates: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Aggregates JSON to read.
    #[arg(value_name = "JSON")]
    pub input: PathBuf,
}
