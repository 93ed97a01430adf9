//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which exposure score to use as the x-axis.
///
/// `Auto` means: prefer the human-rated exposure score if present, else the
/// model-derived (DV) score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExposureAxis {
    Auto,
    Human,
    Dv,
}

/// Concrete exposure kind actually used after resolving `ExposureAxis::Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureKind {
    Human,
    Dv,
}

impl ExposureAxis {
    pub fn to_kind(self) -> Option<ExposureKind> {
        match self {
            ExposureAxis::Auto => None,
            ExposureAxis::Human => Some(ExposureKind::Human),
            ExposureAxis::Dv => Some(ExposureKind::Dv),
        }
    }
}

impl From<ExposureKind> for ExposureAxis {
    fn from(value: ExposureKind) -> Self {
        match value {
            ExposureKind::Human => ExposureAxis::Human,
            ExposureKind::Dv => ExposureAxis::Dv,
        }
    }
}

impl ExposureKind {
    /// CSV column that carries this score.
    pub fn column_name(self) -> &'static str {
        match self {
            ExposureKind::Human => "exposure_human_gamma",
            ExposureKind::Dv => "exposure_dv_gamma",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ExposureKind::Human => "human-rated exposure",
            ExposureKind::Dv => "model-derived exposure",
        }
    }
}

/// How observations are weighted in the fit objective.
///
/// Wage trends across occupations should reflect where people actually work,
/// so the default is to weight each occupation by its employment count. A
/// 2M-person occupation then pulls the trend line harder than a 5k-person one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeightMode {
    /// Use the `employment` column when present, otherwise uniform.
    Auto,
    /// Uniform weights.
    Uniform,
    /// Use the `employment` column (rows without it count as 1).
    Employment,
}

/// A raw row of CSV inputs (mostly optional).
///
/// This mirrors the published occupation-level schema and allows us to:
/// - perform row-level validation with good error messages
/// - export the original fields alongside computed analytics
#[derive(Debug, Clone)]
pub struct OccRow {
    pub soc_code: String,
    pub soc_title: Option<String>,

    pub employment: Option<f64>,
    pub median_annual_wage: Option<f64>,

    pub exposure_human: Option<f64>,
    pub exposure_dv: Option<f64>,

    pub education: Option<String>,
}

/// A normalized occupation point used for fitting.
#[derive(Debug, Clone)]
pub struct OccPoint {
    pub soc_code: String,
    pub soc_title: String,

    /// Exposure score selected by `--exposure` (the regression x).
    pub exposure: f64,

    /// Median annual wage in dollars (the regression y; must be > 0 to fit).
    pub wage: f64,

    /// Observation weight (higher means more influence on the trend).
    pub weight: f64,

    /// Typical entry-level education (for filtering and reporting).
    pub education: Option<String>,
}

impl OccPoint {
    /// View this point as a regression observation.
    pub fn observation(&self) -> Observation {
        Observation {
            x: self.exposure,
            y: self.wage,
            weight: Some(self.weight),
        }
    }
}

/// One (x, y, optional weight) data point submitted for fitting.
///
/// `weight` is resolved to 1 at the boundary of the regression core when
/// absent, so the statistical core itself never null-coalesces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub weight: Option<f64>,
}

/// The x-range over which the fitted trend is rendered.
///
/// Each bound is independently optional; an absent bound defaults to the
/// minimum (resp. maximum) x among the valid points at fit time. The rendered
/// range is independent of the x-range of the underlying data, so a trend can
/// be extrapolated across a wider display window than the observations cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayDomain {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl DisplayDomain {
    /// Both bounds derived from the data.
    pub const AUTO: Self = Self {
        start: None,
        end: None,
    };

    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// Substitute data-derived bounds for absent ones.
    ///
    /// Returns `(x_start, x_end)` in domain order; no reordering happens even
    /// when `x_start > x_end`.
    pub fn resolve(self, x_min: f64, x_max: f64) -> (f64, f64) {
        (self.start.unwrap_or(x_min), self.end.unwrap_or(x_max))
    }
}

/// One point on the fitted trend line, in original (linear-wage) units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub x: f64,
    pub y: f64,
}

/// Output of the weighted log-linear fit.
///
/// `slope` and `intercept` live in log10(y)-per-unit-x space; the endpoint
/// coordinates are back-transformed to linear wage units for display.
/// `r_squared` is computed in log space and is exactly 0 when the weighted
/// total variance of log10(y) is zero ("fit exists but explains nothing").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Endpoints at the resolved display-domain bounds, start then end.
    pub points: [TrendPoint; 2],
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl RegressionResult {
    /// Fitted log10(wage) at exposure `x`.
    pub fn predict_log10(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Fitted wage in dollars at exposure `x`.
    pub fn predict(&self, x: f64) -> f64 {
        10f64.powf(self.predict_log10(x))
    }
}

/// A per-occupation fitted result (used for ranking and exports).
#[derive(Debug, Clone)]
pub struct TrendResidual {
    pub point: OccPoint,
    /// Fitted wage at this occupation's exposure, in dollars.
    pub wage_fit: f64,
    /// `log10(wage) - log10(wage_fit)`; positive means paid above trend.
    pub log_residual: f64,
}

/// Summary stats about the points actually used for fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_points: usize,
    pub exposure_min: f64,
    pub exposure_max: f64,
    pub wage_min: f64,
    pub wage_max: f64,
    pub employment_total: f64,
}

impl DatasetStats {
    /// Compute stats over normalized points; `None` when empty or non-finite.
    pub fn from_points(points: &[OccPoint]) -> Option<Self> {
        let mut exposure_min = f64::INFINITY;
        let mut exposure_max = f64::NEG_INFINITY;
        let mut wage_min = f64::INFINITY;
        let mut wage_max = f64::NEG_INFINITY;
        let mut employment_total = 0.0;

        for p in points {
            exposure_min = exposure_min.min(p.exposure);
            exposure_max = exposure_max.max(p.exposure);
            wage_min = wage_min.min(p.wage);
            wage_max = wage_max.max(p.wage);
            employment_total += p.weight;
        }

        if !exposure_min.is_finite()
            || !exposure_max.is_finite()
            || !wage_min.is_finite()
            || !wage_max.is_finite()
        {
            return None;
        }

        Some(DatasetStats {
            n_points: points.len(),
            exposure_min,
            exposure_max,
            wage_min,
            wage_max,
            employment_total,
        })
    }
}

/// High-level, resolved input conventions for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    pub asof_date: NaiveDate,
    pub exposure: ExposureKind,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Occupation CSV; when absent, a deterministic synthetic sample is used.
    pub csv_path: Option<PathBuf>,
    pub asof_date: NaiveDate,
    pub exposure_axis: ExposureAxis,
    pub weight_mode: WeightMode,

    /// Display domain for the rendered trend (`--x-start` / `--x-end`).
    pub domain: DisplayDomain,

    pub filter_education: Option<String>,

    pub sample_count: usize,
    pub sample_seed: u64,
    /// Std dev of log10-wage noise for synthetic samples.
    pub sample_noise: f64,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_trend: Option<PathBuf>,
    /// Number of sampled line points in the trend JSON export.
    pub grid_points: usize,
}

/// A saved trend file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFile {
    pub tool: String,
    pub asof_date: NaiveDate,
    pub exposure: ExposureKind,
    pub result: RegressionResult,
    pub grid: TrendGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendGrid {
    pub exposure: Vec<f64>,
    pub wage: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_domain_resolves_absent_bounds_from_data() {
        let d = DisplayDomain::AUTO;
        assert_eq!(d.resolve(0.2, 0.9), (0.2, 0.9));

        let d = DisplayDomain::new(Some(0.0), None);
        assert_eq!(d.resolve(0.2, 0.9), (0.0, 0.9));

        let d = DisplayDomain::new(None, Some(1.5));
        assert_eq!(d.resolve(0.2, 0.9), (0.2, 1.5));
    }

    #[test]
    fn display_domain_preserves_order_of_explicit_bounds() {
        // Reversed bounds are passed through untouched.
        let d = DisplayDomain::new(Some(2.0), Some(-1.0));
        assert_eq!(d.resolve(0.0, 1.0), (2.0, -1.0));
    }

    #[test]
    fn predict_is_exponentiated_line() {
        let r = RegressionResult {
            points: [
                TrendPoint { x: 0.0, y: 10.0 },
                TrendPoint { x: 2.0, y: 1000.0 },
            ],
            slope: 1.0,
            intercept: 1.0,
            r_squared: 1.0,
        };
        assert!((r.predict(0.0) - 10.0).abs() < 1e-9);
        assert!((r.predict(2.0) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn stats_from_points_accumulates_employment() {
        let points = vec![
            OccPoint {
                soc_code: "11-1011".to_string(),
                soc_title: "Chief Executives".to_string(),
                exposure: 0.4,
                wage: 180_000.0,
                weight: 200_000.0,
                education: None,
            },
            OccPoint {
                soc_code: "35-3023".to_string(),
                soc_title: "Fast Food Workers".to_string(),
                exposure: 0.1,
                wage: 28_000.0,
                weight: 3_000_000.0,
                education: None,
            },
        ];

        let stats = DatasetStats::from_points(&points).unwrap();
        assert_eq!(stats.n_points, 2);
        assert!((stats.exposure_min - 0.1).abs() < 1e-12);
        assert!((stats.exposure_max - 0.4).abs() < 1e-12);
        assert!((stats.wage_min - 28_000.0).abs() < 1e-9);
        assert!((stats.wage_max - 180_000.0).abs() < 1e-9);
        assert!((stats.employment_total - 3_200_000.0).abs() < 1e-6);
    }
}
