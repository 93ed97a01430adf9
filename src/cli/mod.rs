//! Command-line parsing for the wage trend fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{ExposureAxis, WeightMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "wtrend",
    version,
    about = "Occupation wage vs. AI-exposure trend fitter (weighted log-linear)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the trend, print diagnostics/rankings, and optionally plot/export.
    Fit(FitArgs),
    /// Print above/below-trend rankings only (useful for scripting).
    Rank(FitArgs),
    /// Plot a previously exported trend JSON.
    Plot(PlotArgs),
}

/// Common options for fitting and ranking.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Occupation CSV (soc_code, median_annual_wage, exposure columns, ...).
    /// When omitted, a deterministic synthetic sample is generated instead.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// As-of date stamped into reports and exports (defaults to today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub asof: Option<NaiveDate>,

    /// Which exposure score is the x-axis.
    #[arg(short = 'x', long, value_enum, default_value_t = ExposureAxis::Auto)]
    pub exposure: ExposureAxis,

    /// How observations are weighted in the fit objective.
    #[arg(long, value_enum, default_value_t = WeightMode::Auto)]
    pub weight_mode: WeightMode,

    /// Left display-domain bound for the rendered trend (defaults to min exposure).
    #[arg(long)]
    pub x_start: Option<f64>,

    /// Right display-domain bound for the rendered trend (defaults to max exposure).
    #[arg(long)]
    pub x_end: Option<f64>,

    /// Only fit occupations with this typical entry-level education.
    #[arg(long)]
    pub education: Option<String>,

    /// Number of synthetic occupations when no CSV is supplied.
    #[arg(short = 'n', long, default_value_t = 120)]
    pub sample_count: usize,

    /// Random seed for synthetic sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Std dev of log10-wage noise for synthetic samples.
    #[arg(long, default_value_t = 0.08)]
    pub sample_noise: f64,

    /// Show top-N occupations above and below trend.
    #[arg(long, default_value_t = 15)]
    pub top: usize,

    /// Disable the terminal plot (enabled by default for `fit`).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-occupation results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the trend (line + params + sampled grid) to JSON.
    #[arg(long = "export-trend")]
    pub export_trend: Option<PathBuf>,

    /// Number of sampled line points in the trend JSON export.
    #[arg(long, default_value_t = 64)]
    pub grid_points: usize,
}

/// Options for plotting a saved trend.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Trend JSON file produced by `wtrend fit --export-trend`.
    #[arg(long, value_name = "JSON")]
    pub trend: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
