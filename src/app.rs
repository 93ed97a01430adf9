//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads occupation data (CSV or synthetic sample)
//! - runs the weighted log-linear fit
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::{DisplayDomain, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `wtrend` binary.
pub fn run() -> Result<(), AppError> {
    // We want `wtrend` and `wtrend --csv data.csv` to behave like
    // `wtrend fit ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Rank(args) => handle_fit(args, OutputMode::RankOnly),
        Command::Plot(args) => handle_plot(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_run_summary(
                    &run.ingest.stats,
                    &run.ingest.spec,
                    &run.result,
                    &config
                )
            );
        }
        OutputMode::RankOnly => {}
    }

    println!("{}", crate::report::format_rankings(&run.rankings));

    if mode == OutputMode::Full && config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            &run.result,
            config.plot_width,
            config.plot_height,
            Some(&run.rankings),
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.residuals, &run.ingest.spec)?;
    }
    if let Some(path) = &config.export_trend {
        crate::io::trend::write_trend_json(path, &run.result, &run.ingest.spec, &config)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let trend = crate::io::trend::read_trend_json(&args.trend)?;
    let plot = crate::plot::render_ascii_plot_from_trend_file(&trend, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        asof_date: args
            .asof
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        exposure_axis: args.exposure,
        weight_mode: args.weight_mode,
        domain: DisplayDomain::new(args.x_start, args.x_end),
        filter_education: args.education.clone(),
        sample_count: args.sample_count,
        sample_seed: args.seed,
        sample_noise: args.sample_noise,
        top_n: args.top,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_trend: args.export_trend.clone(),
        grid_points: args.grid_points,
    }
}

/// Rewrite argv so `wtrend` defaults to `wtrend fit`.
///
/// Rules:
/// - `wtrend`                    -> `wtrend fit`
/// - `wtrend --csv data.csv ...` -> `wtrend fit --csv data.csv ...`
/// - `wtrend --help/--version`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "rank" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
