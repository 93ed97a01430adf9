//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The wage axis is drawn in log10 space so the fitted trend renders as a
//! straight line, matching the space the regression actually runs in.
//!
//! Plot elements:
//! - observed occupations: `o`
//! - fitted trend: `-` line
//! - optional highlights: `A` (above trend), `B` (below trend)

use std::collections::HashSet;

use crate::domain::{RegressionResult, TrendFile, TrendResidual};
use crate::report::Rankings;

/// Render a plot for an in-memory fit result.
pub fn render_ascii_plot(
    residuals: &[TrendResidual],
    fit: &RegressionResult,
    width: usize,
    height: usize,
    rankings: Option<&Rankings>,
) -> String {
    let (x_min, x_max) = x_range(residuals, fit);
    let curve = sample_trend(fit, x_min, x_max, width.max(2));
    render_plot(residuals, &curve, x_min, x_max, width, height, rankings)
}

/// Render a plot from a saved trend JSON file (line only, no overlay points).
pub fn render_ascii_plot_from_trend_file(trend: &TrendFile, width: usize, height: usize) -> String {
    let (x_min, x_max) = x_range(&[], &trend.result);
    let curve: Vec<(f64, f64)> = trend
        .grid
        .exposure
        .iter()
        .zip(trend.grid.wage.iter())
        .map(|(&x, &w)| (x, w.log10()))
        .collect();

    render_plot(&[], &curve, x_min, x_max, width, height, None)
}

/// Sample the fitted trend as `(x, log10(wage))` pairs.
fn sample_trend(fit: &RegressionResult, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, fit.predict_log10(x))
        })
        .collect()
}

/// X-range covering both the scatter and the trend endpoints.
///
/// Endpoints are kept in range even when the display domain extrapolates past
/// the observed exposures; a reversed domain still plots left-to-right.
fn x_range(residuals: &[TrendResidual], fit: &RegressionResult) -> (f64, f64) {
    let mut x_min = fit.points[0].x.min(fit.points[1].x);
    let mut x_max = fit.points[0].x.max(fit.points[1].x);
    for r in residuals {
        x_min = x_min.min(r.point.exposure);
        x_max = x_max.max(r.point.exposure);
    }
    if x_min == x_max {
        // Degenerate window; widen a hair so mapping stays defined.
        (x_min - 0.5, x_max + 0.5)
    } else {
        (x_min, x_max)
    }
}

fn render_plot(
    residuals: &[TrendResidual],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
    rankings: Option<&Rankings>,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Determine the log-wage range from observed points and curve points.
    let (ly_min, ly_max) = y_range(residuals, curve).unwrap_or((0.0, 1.0));
    let (ly_min, ly_max) = pad_range(ly_min, ly_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the trend first (so points can overlay).
    for &(x, ly) in curve {
        if !ly.is_finite() {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(ly, ly_min, ly_max, height);
        grid[row][col] = '-';
    }

    // Highlight sets (soc codes).
    let (above_ids, below_ids): (HashSet<String>, HashSet<String>) = rankings
        .map(|r| {
            (
                r.above.iter().map(|x| x.point.soc_code.clone()).collect(),
                r.below.iter().map(|x| x.point.soc_code.clone()).collect(),
            )
        })
        .unwrap_or_default();

    for r in residuals {
        let ly = r.point.wage.log10();
        if !ly.is_finite() {
            continue;
        }
        let col = map_x(r.point.exposure, x_min, x_max, width);
        let row = map_y(ly, ly_min, ly_max, height);

        let ch = if above_ids.contains(&r.point.soc_code) {
            'A'
        } else if below_ids.contains(&r.point.soc_code) {
            'B'
        } else {
            'o'
        };

        grid[row][col] = ch;
    }

    // Build the final string with a small header carrying the ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: exposure=[{x_min:.3}, {x_max:.3}] | wage=[${:.0}, ${:.0}] (log scale)\n",
        10f64.powf(ly_min),
        10f64.powf(ly_max),
    ));
    for row in grid {
        let line: String = row.into_iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str("legend: o = occupation, - = trend, A = above trend, B = below trend\n");

    out
}

fn y_range(residuals: &[TrendResidual], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;

    for r in residuals {
        let ly = r.point.wage.log10();
        if ly.is_finite() {
            lo = lo.min(ly);
            hi = hi.max(ly);
        }
    }
    for &(_, ly) in curve {
        if ly.is_finite() {
            lo = lo.min(ly);
            hi = hi.max(ly);
        }
    }

    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

fn pad_range(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 0.5, hi + 0.5);
    }
    (lo - span * frac, hi + span * frac)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    let inverted = 1.0 - u;
    ((inverted * (height as f64 - 1.0)).round() as usize).min(height - 1)
}
