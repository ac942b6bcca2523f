//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - assembles the session dataset
//! - prints reports/plots or writes exports
//! - prints previously exported aggregates
//! - launches the TUI

use clap::Parser;

use crate::cli::{Command, DatasetArgs, ExportArgs, ShowArgs, SummaryArgs};
use crate::data::Assembler;
use crate::domain::DatasetConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `dash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `dash` and `dash --seed 7` behave like `dash tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Export(args) => handle_export(args),
        Command::Show(args) => handle_show(&args),
        Command::Tui(args) => crate::tui::run(dataset_config_from_args(&args)),
    }
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = dataset_config_from_args(&args.dataset);
    let mut assembler = Assembler::new();
    let run = pipeline::run_dashboard(&mut assembler, &config)?;

    println!("{}", crate::report::format_dataset_summary(&run.dataset, &config));
    println!("{}", crate::report::format_rows(run.dataset.rows(), args.head));
    println!("{}", crate::report::format_aggregates(&run.aggregates));

    if args.plot {
        let series = crate::plot::daily_sales_series(&run.dataset);
        println!("{}", crate::plot::render_ascii_series(&series, args.width, args.height));
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = dataset_config_from_args(&args.dataset);
    let mut assembler = Assembler::new();
    let run = pipeline::run_dashboard(&mut assembler, &config)?;

    crate::io::write_dataset_csv(&args.csv, &run.dataset)?;
    println!("Wrote {} rows to {}", run.dataset.len(), args.csv.display());

    if let Some(path) = &args.aggregates {
        crate::io::write_aggregates_json(path, &run.aggregates, &config)?;
        println!("Wrote aggregates to {}", path.display());
    }

    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<(), AppError> {
    let saved = crate::io::read_aggregates_json(&args.input)?;
    println!("{}", crate::report::format_saved_aggregates(&saved));
    Ok(())
}

pub fn dataset_config_from_args(args: &DatasetArgs) -> DatasetConfig {
    DatasetConfig {
        seed: args.seed,
        row_count: args.rows,
        start_date: args.start,
    }
}

/// Rewrite argv so `dash` defaults to `dash tui`.
///
/// Rules:
/// - `dash`                      -> `dash tui`
/// - `dash --seed 7 ...`         -> `dash tui --seed 7 ...`
/// - `dash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "export" | "show" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_tui() {
        assert_eq!(rewrite_args(argv(&["dash"])), argv(&["dash", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["dash", "--seed", "7"])),
            argv(&["dash", "tui", "--seed", "7"])
        );
    }

    #[test]
    fn show_reports_unreadable_files_as_usage_errors() {
        let args = ShowArgs {
            input: "/definitely/not/here.json".into(),
        };
        assert_eq!(handle_show(&args).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn explicit_subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["dash", "summary"])), argv(&["dash", "summary"]));
        assert_eq!(
            rewrite_args(argv(&["dash", "show", "a.json"])),
            argv(&["dash", "show", "a.json"])
        );
        assert_eq!(rewrite_args(argv(&["dash", "--help"])), argv(&["dash", "--help"]));
    }
}
