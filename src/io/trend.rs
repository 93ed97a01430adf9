//! Saved trend files (JSON).
//!
//! A trend file carries the fitted line (slope/intercept/R² + endpoints) and a
//! sampled grid so downstream consumers can plot it without re-deriving the
//! back-transform.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::domain::{FitConfig, RegressionResult, RunSpec, TrendFile, TrendGrid};
use crate::error::AppError;

/// Sample the fitted trend between its endpoints.
///
/// The grid follows domain order, so an extrapolated or reversed display
/// domain is preserved in the export.
pub fn sample_trend_grid(fit: &RegressionResult, n: usize) -> TrendGrid {
    let n = n.max(2);
    let x0 = fit.points[0].x;
    let x1 = fit.points[1].x;

    let mut exposure = Vec::with_capacity(n);
    let mut wage = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x0 + u * (x1 - x0);
        exposure.push(x);
        wage.push(fit.predict(x));
    }

    TrendGrid { exposure, wage }
}

/// Write the fitted trend to a JSON file.
pub fn write_trend_json(
    path: &Path,
    fit: &RegressionResult,
    spec: &RunSpec,
    config: &FitConfig,
) -> Result<(), AppError> {
    let trend = TrendFile {
        tool: format!("wtrend {}", env!("CARGO_PKG_VERSION")),
        asof_date: spec.asof_date,
        exposure: spec.exposure,
        result: fit.clone(),
        grid: sample_trend_grid(fit, config.grid_points),
    };

    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create trend JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &trend)
        .map_err(|e| AppError::new(2, format!("Failed to write trend JSON: {e}")))?;

    Ok(())
}

/// Read a trend JSON file written by `write_trend_json`.
pub fn read_trend_json(path: &Path) -> Result<TrendFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open trend JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Failed to parse trend JSON: {e}")))
}
