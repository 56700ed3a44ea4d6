//! Command-line parsing for the demand period planner.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the period/pipeline code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Fallback, Granularity};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dp", version, about = "Demand planning periods: labels, boundaries and stitched series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the period table (and optionally an ASCII chart).
    Table(TableArgs),
    /// Write the view as JSON and/or CSV.
    Export(ExportArgs),
    /// Print the label sequence with edit classes only.
    Labels(ViewArgs),
    /// Launch the interactive TUI.
    ///
    /// Same pipeline as `dp table`, rendered with Ratatui, plus consensus
    /// editing for the editable period.
    Tui(ViewArgs),
}

/// Options shared by every command: what to bucket and where values come from.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// First date of the range (YYYY-MM-DD). Defaults to `--back` periods before today.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last date of the range (YYYY-MM-DD). Defaults to `--ahead` periods after today.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Bucket size.
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Monthly)]
    pub granularity: Granularity,

    /// Periods before today when `--start` is not given.
    #[arg(long, default_value_t = 6)]
    pub back: u32,

    /// Periods after today when `--end` is not given.
    #[arg(long, default_value_t = 6)]
    pub ahead: u32,

    /// Treat this date as "today" (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Where "now" lands when today's period is outside the range.
    #[arg(long, value_enum, default_value_t = Fallback::Nearest)]
    pub fallback: Fallback,

    /// Read values from a JSON or CSV file instead of the API.
    #[arg(short = 'i', long, value_name = "FILE", conflicts_with = "sample")]
    pub input: Option<PathBuf>,

    /// Use synthetic demand instead of the API.
    #[arg(long)]
    pub sample: bool,

    /// Random seed for `--sample`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for the table command.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Render an ASCII chart below the table.
    #[arg(long)]
    pub plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the export command.
#[derive(Debug, Args, Clone)]
#[command(group(clap::ArgGroup::new("target").required(true).multiple(true).args(["json", "csv"])))]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Write the full view (labels, boundary, classes, series) as JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Write per-period values as a wide CSV table.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_table_flags() {
        let cli = Cli::try_parse_from([
            "dp", "table", "--start", "2024-10-01", "--end", "2025-01-31", "-g", "weekly", "--today",
            "2024-11-15", "--fallback", "not-after", "--sample", "--plot",
        ])
        .unwrap();
        let Command::Table(args) = cli.command else {
            panic!("expected table command");
        };
        assert_eq!(args.view.start, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert_eq!(args.view.granularity, Granularity::Weekly);
        assert_eq!(args.view.fallback, Fallback::NotAfter);
        assert!(args.view.sample);
        assert!(args.plot);
    }

    #[test]
    fn export_requires_a_target() {
        assert!(Cli::try_parse_from(["dp", "export", "--sample"]).is_err());
        assert!(Cli::try_parse_from(["dp", "export", "--sample", "--csv", "out.csv"]).is_ok());
    }

    #[test]
    fn input_conflicts_with_sample() {
        assert!(Cli::try_parse_from(["dp", "labels", "--sample", "-i", "values.csv"]).is_err());
    }
}
