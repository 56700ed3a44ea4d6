//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initialises logging
//! - resolves the date range, "today" and the value source
//! - prints tables/charts or writes exports

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, TableArgs, ViewArgs};
use crate::data::DemandApiClient;
use crate::domain::{DataSource, Granularity, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `dp` binary.
pub fn run() -> Result<(), AppError> {
    // `dp` and `dp -g weekly` behave like `dp tui ...`; clap needs the
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Log lines on stderr would corrupt the TUI's alternate screen.
    let default_filter = match cli.command {
        Command::Tui(_) => "off",
        _ => "warn",
    };
    init_tracing(default_filter);

    match cli.command {
        Command::Table(args) => handle_table(args),
        Command::Export(args) => handle_export(args),
        Command::Labels(args) => handle_labels(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let mut config = run_config_from_args(&args.view, local_today())?;
    config.plot = args.plot;
    config.plot_width = args.width;
    config.plot_height = args.height;

    let run = pipeline::run_view(&config)?;
    let totals = crate::report::compute_totals(&run.view);

    println!("{}", crate::report::format_summary(&run.view, &totals));
    println!("{}", crate::report::format_view_table(&run.view));

    if config.plot {
        let chart = crate::plot::render_ascii_chart(&run.view, config.plot_width, config.plot_height);
        println!("{chart}");
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let mut config = run_config_from_args(&args.view, local_today())?;
    config.export_json = args.json;
    config.export_csv = args.csv;

    let run = pipeline::run_view(&config)?;

    if let Some(path) = &config.export_json {
        crate::io::export::write_view_json(path, &run.view)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_view_csv(path, &run.view)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_labels(args: ViewArgs) -> Result<(), AppError> {
    let view = labels_view(&args, local_today())?;

    println!("boundary: {}", view.boundary_index);
    for (label, class) in view.labels.iter().zip(&view.classes) {
        println!("{label:<10} {class}");
    }
    Ok(())
}

fn handle_tui(args: ViewArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args, local_today())?;
    crate::tui::run(config)
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Labels never need values, so no source is resolved or consulted.
fn labels_view(args: &ViewArgs, fallback_today: NaiveDate) -> Result<pipeline::ForecastView, AppError> {
    let (request, today) = request_from_args(args, fallback_today)?;
    Ok(pipeline::build_view(&request, &Default::default(), today)?)
}

/// Resolve the date range, granularity and "today" from CLI flags.
pub fn request_from_args(
    args: &ViewArgs,
    fallback_today: NaiveDate,
) -> Result<(pipeline::ForecastRequest, NaiveDate), AppError> {
    let today = args.today.unwrap_or(fallback_today);
    let (start, end) = resolve_range(args, today)?;
    let request = pipeline::ForecastRequest {
        start,
        end,
        granularity: args.granularity,
        fallback: args.fallback,
    };
    Ok((request, today))
}

/// Resolve CLI flags into a run configuration, including the value source.
///
/// `fallback_today` is used when `--today` is absent; tests inject it.
pub fn run_config_from_args(args: &ViewArgs, fallback_today: NaiveDate) -> Result<RunConfig, AppError> {
    let (request, today) = request_from_args(args, fallback_today)?;

    let source = match (&args.input, args.sample) {
        (Some(path), _) => DataSource::File(path.clone()),
        (None, true) => DataSource::Sample { seed: args.seed },
        (None, false) if DemandApiClient::is_configured() => DataSource::Api,
        (None, false) => {
            return Err(AppError::new(
                2,
                "No data source: set DEMAND_API_URL (or .env), or pass --input <file> or --sample.",
            ));
        }
    };

    Ok(RunConfig {
        start: request.start,
        end: request.end,
        granularity: request.granularity,
        fallback: request.fallback,
        today,
        source,
        plot: false,
        plot_width: 80,
        plot_height: 20,
        export_json: None,
        export_csv: None,
    })
}

fn resolve_range(args: &ViewArgs, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    let anchor = args.granularity.period_start(today);
    let start = match args.start {
        Some(d) => d,
        None => step(args.granularity, anchor, args.back, Granularity::retreat)?,
    };
    let end = match args.end {
        Some(d) => d,
        None => step(args.granularity, anchor, args.ahead, Granularity::advance)?,
    };
    Ok((start, end))
}

fn step(
    granularity: Granularity,
    anchor: NaiveDate,
    n: u32,
    f: fn(Granularity, NaiveDate) -> Option<NaiveDate>,
) -> Result<NaiveDate, AppError> {
    (0..n).try_fold(anchor, |d, _| {
        f(granularity, d).ok_or_else(|| AppError::new(2, "Date range is out of bounds."))
    })
}

/// Rewrite argv so `dp` defaults to `dp tui`.
///
/// Rules:
/// - `dp`                      -> `dp tui`
/// - `dp -g weekly ...`        -> `dp tui -g weekly ...`
/// - `dp --help/--version/-h`  -> unchanged (show top-level help/version)
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

    let is_subcommand = matches!(arg1.as_str(), "table" | "export" | "labels" | "tui");
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
    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn view_args(args: &[&str]) -> ViewArgs {
        let mut full = vec!["dp", "labels"];
        full.extend_from_slice(args);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Labels(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["dp"])), argv(&["dp", "tui"]));
        assert_eq!(rewrite_args(argv(&["dp", "-g", "weekly"])), argv(&["dp", "tui", "-g", "weekly"]));
        assert_eq!(rewrite_args(argv(&["dp", "--help"])), argv(&["dp", "--help"]));
        assert_eq!(rewrite_args(argv(&["dp", "table"])), argv(&["dp", "table"]));
    }

    #[test]
    fn default_range_is_centered_on_today() {
        let args = view_args(&["--sample", "--back", "2", "--ahead", "3"]);
        let config = run_config_from_args(&args, d(2024, 11, 15)).unwrap();
        assert_eq!(config.start, d(2024, 9, 1));
        assert_eq!(config.end, d(2025, 2, 1));
        assert_eq!(config.today, d(2024, 11, 15));
        assert_eq!(config.source, DataSource::Sample { seed: 42 });
    }

    #[test]
    fn weekly_default_range_steps_by_weeks() {
        let args = view_args(&["--sample", "-g", "weekly", "--back", "1", "--ahead", "1", "--today", "2024-12-31"]);
        let config = run_config_from_args(&args, d(2000, 1, 1)).unwrap();
        assert_eq!(config.start, d(2024, 12, 23));
        assert_eq!(config.end, d(2025, 1, 6));
        assert_eq!(config.today, d(2024, 12, 31));
    }

    #[test]
    fn input_file_wins_as_source() {
        let args = view_args(&["-i", "values.csv"]);
        let config = run_config_from_args(&args, d(2024, 11, 15)).unwrap();
        assert_eq!(config.source, DataSource::File("values.csv".into()));
    }

    #[test]
    fn labels_resolve_without_a_data_source() {
        let args = view_args(&["--today", "2024-11-15", "--back", "1", "--ahead", "1"]);
        let view = labels_view(&args, d(2000, 1, 1)).unwrap();
        assert_eq!(view.labels, vec!["Oct 24", "Nov 24", "Dec 24"]);
        assert_eq!(view.boundary_index, 1);
        assert!(view.rows.iter().all(|row| row.values.iter().all(Option::is_none)));
    }
}
