//! Weighted log-linear regression.
//!
//! We fit a straight line to `log10(y)` versus `x`, minimizing
//!
//! ```text
//! Σ w_i (log10(y_i) - (intercept + slope * x_i))^2
//! ```
//!
//! and report the line back in original (linear-y) units by exponentiating the
//! predictions at the two display-domain bounds.
//!
//! Implementation choices:
//! - The parameter dimension is fixed at 2 (slope + intercept), so we solve the
//!   normal equations in closed form from five running sums rather than
//!   building a design matrix.
//! - "Not computable" is an `Option::None`, never an error: too few valid
//!   points, zero total weight, and zero weighted x-variance are all routine
//!   data states (e.g., a chart with a single wage category).
//! - Malformed individual observations (non-finite x/y, non-positive y) are
//!   filtered out and the fit proceeds over the remainder.
//! - R² is reported as exactly 0 when the weighted total sum of squares is
//!   zero. That signals "no explanatory variance", not a perfect fit, and lets
//!   callers suppress a trend line of spurious confidence.

use crate::domain::{DisplayDomain, Observation, RegressionResult, TrendPoint};

/// A validated observation carried through one fit, in log space.
#[derive(Debug, Clone, Copy)]
struct LogPoint {
    x: f64,
    log_y: f64,
    w: f64,
}

/// Points must be finite in both coordinates and strictly positive in y
/// (the log transform is undefined otherwise).
fn is_valid(obs: &Observation) -> bool {
    obs.x.is_finite() && obs.y.is_finite() && obs.y > 0.0
}

/// Fit a weighted least-squares line to `log10(y)` versus `x` and evaluate it
/// at the resolved display-domain bounds.
///
/// Weights default to 1 when absent and are clamped to a minimum of 0 so a
/// negative weight can never flip the fit. Returns `None` when fewer than two
/// valid points remain, when the total weight is zero, or when the weighted
/// x-variance is exactly zero (all x equal, or weight concentrated on a single
/// x value) — slope is undefined in those cases.
pub fn fit_log_linear(points: &[Observation], domain: DisplayDomain) -> Option<RegressionResult> {
    let valid: Vec<(f64, f64, f64)> = points
        .iter()
        .filter(|p| is_valid(p))
        .map(|p| (p.x, p.y, p.weight.unwrap_or(1.0)))
        .collect();

    if valid.len() < 2 {
        return None;
    }

    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    for &(x, _, _) in &valid {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
    }
    let (x_start, x_end) = domain.resolve(x_min, x_max);

    let log_points: Vec<LogPoint> = valid
        .iter()
        .map(|&(x, y, w)| LogPoint {
            x,
            log_y: y.log10(),
            w: w.max(0.0),
        })
        .collect();

    let mut sum_w = 0.0;
    let mut sum_wx = 0.0;
    let mut sum_wy = 0.0;
    let mut sum_wxy = 0.0;
    let mut sum_wx2 = 0.0;

    for p in &log_points {
        sum_w += p.w;
        sum_wx += p.w * p.x;
        sum_wy += p.w * p.log_y;
        sum_wxy += p.w * p.x * p.log_y;
        sum_wx2 += p.w * p.x * p.x;
    }

    if sum_w == 0.0 {
        return None;
    }

    let denominator = sum_w * sum_wx2 - sum_wx * sum_wx;
    if denominator == 0.0 {
        return None;
    }

    let slope = (sum_w * sum_wxy - sum_wx * sum_wy) / denominator;
    let intercept = (sum_wy - slope * sum_wx) / sum_w;

    let mean_y = sum_wy / sum_w;
    let mut total_sum_squares = 0.0;
    let mut residual_sum_squares = 0.0;

    for p in &log_points {
        total_sum_squares += p.w * (p.log_y - mean_y).powi(2);
        residual_sum_squares += p.w * (p.log_y - (intercept + slope * p.x)).powi(2);
    }

    let r_squared = if total_sum_squares > 0.0 {
        1.0 - residual_sum_squares / total_sum_squares
    } else {
        0.0
    };

    let start_y = 10f64.powf(intercept + slope * x_start);
    let end_y = 10f64.powf(intercept + slope * x_end);

    Some(RegressionResult {
        points: [
            TrendPoint {
                x: x_start,
                y: start_y,
            },
            TrendPoint { x: x_end, y: end_y },
        ],
        slope,
        intercept,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(x: f64, y: f64) -> Observation {
        Observation { x, y, weight: None }
    }

    fn obs_w(x: f64, y: f64, w: f64) -> Observation {
        Observation {
            x,
            y,
            weight: Some(w),
        }
    }

    #[test]
    fn empty_and_single_point_inputs_yield_no_fit() {
        assert!(fit_log_linear(&[], DisplayDomain::AUTO).is_none());
        assert!(fit_log_linear(&[obs(1.0, 10.0)], DisplayDomain::AUTO).is_none());

        // One valid point plus garbage is still a single valid point.
        let points = [obs(1.0, 10.0), obs(f64::NAN, 5.0), obs(2.0, -3.0)];
        assert!(fit_log_linear(&points, DisplayDomain::AUTO).is_none());
    }

    #[test]
    fn absent_weight_behaves_as_weight_one() {
        let with_default = [obs(0.0, 10.0), obs(1.0, 100.0), obs(2.0, 900.0)];
        let with_explicit = [
            obs_w(0.0, 10.0, 1.0),
            obs_w(1.0, 100.0, 1.0),
            obs_w(2.0, 900.0, 1.0),
        ];

        let a = fit_log_linear(&with_default, DisplayDomain::AUTO).unwrap();
        let b = fit_log_linear(&with_explicit, DisplayDomain::AUTO).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_points_never_influence_the_fit() {
        let clean = [obs(0.0, 10.0), obs(1.0, 100.0), obs(2.0, 1000.0)];
        let noisy = [
            obs(0.0, 10.0),
            obs(f64::NAN, 50.0),
            obs(1.0, 100.0),
            obs(0.5, f64::INFINITY),
            obs(0.7, 0.0),
            obs(0.9, -40.0),
            obs(2.0, 1000.0),
        ];

        let a = fit_log_linear(&clean, DisplayDomain::AUTO).unwrap();
        let b = fit_log_linear(&noisy, DisplayDomain::AUTO).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn identical_x_values_yield_no_fit() {
        let points = [obs(1.0, 10.0), obs(1.0, 100.0), obs(1.0, 1000.0)];
        assert!(fit_log_linear(&points, DisplayDomain::AUTO).is_none());
    }

    #[test]
    fn weight_concentrated_on_single_x_yields_no_fit() {
        // Two distinct x values, but all weight sits on one of them.
        let points = [
            obs_w(1.0, 10.0, 5.0),
            obs_w(1.0, 20.0, 3.0),
            obs_w(2.0, 40.0, 0.0),
        ];
        assert!(fit_log_linear(&points, DisplayDomain::AUTO).is_none());
    }

    #[test]
    fn all_weights_zero_yields_no_fit() {
        let points = [obs_w(0.0, 10.0, 0.0), obs_w(1.0, 100.0, 0.0)];
        assert!(fit_log_linear(&points, DisplayDomain::AUTO).is_none());
    }

    #[test]
    fn auto_domain_spans_min_and_max_valid_x() {
        let points = [
            obs(3.0, 1000.0),
            obs(1.0, 10.0),
            obs(2.0, 100.0),
            // Invalid x must not widen the domain.
            obs(-50.0, 0.0),
        ];
        let fit = fit_log_linear(&points, DisplayDomain::AUTO).unwrap();
        assert_eq!(fit.points[0].x, 1.0);
        assert_eq!(fit.points[1].x, 3.0);
    }

    #[test]
    fn explicit_domain_extrapolates_beyond_the_data() {
        // log10(y) = x exactly.
        let points = [obs(1.0, 10.0), obs(2.0, 100.0), obs(3.0, 1000.0)];
        let fit = fit_log_linear(&points, DisplayDomain::new(Some(0.0), Some(4.0))).unwrap();

        assert_eq!(fit.points[0].x, 0.0);
        assert_eq!(fit.points[1].x, 4.0);
        assert!((fit.points[0].y - 1.0).abs() < 1e-9);
        assert!((fit.points[1].y - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn perfect_log_linear_data_has_unit_r_squared() {
        // (1,10),(2,100),(3,1000): log10(y) = x.
        let points = [obs(1.0, 10.0), obs(2.0, 100.0), obs(3.0, 1000.0)];
        let fit = fit_log_linear(&points, DisplayDomain::AUTO).unwrap();

        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!(fit.intercept.abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_y_reports_zero_r_squared_without_faulting() {
        let points = [obs(1.0, 10.0), obs(2.0, 10.0), obs(3.0, 10.0)];
        let fit = fit_log_linear(&points, DisplayDomain::AUTO).unwrap();

        // Zero total variance is a defined degenerate case, not an error.
        assert_eq!(fit.r_squared, 0.0);
        assert!(fit.slope.abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn endpoints_are_consistent_with_the_log_space_line() {
        let points = [
            obs_w(0.1, 31_000.0, 2_500_000.0),
            obs_w(0.35, 52_000.0, 900_000.0),
            obs_w(0.6, 88_000.0, 400_000.0),
            obs_w(0.85, 121_000.0, 150_000.0),
        ];
        let fit = fit_log_linear(&points, DisplayDomain::new(Some(0.0), Some(1.0))).unwrap();

        for p in &fit.points {
            let expected = 10f64.powf(fit.intercept + fit.slope * p.x);
            assert_eq!(p.y, expected);
        }
    }

    #[test]
    fn negative_weight_is_clamped_to_zero() {
        let base = [
            obs_w(0.0, 10.0, 1.0),
            obs_w(1.0, 100.0, 1.0),
            obs_w(2.0, 5000.0, -7.5),
        ];
        let clamped = [
            obs_w(0.0, 10.0, 1.0),
            obs_w(1.0, 100.0, 1.0),
            obs_w(2.0, 5000.0, 0.0),
        ];

        let a = fit_log_linear(&base, DisplayDomain::AUTO).unwrap();
        let b = fit_log_linear(&clamped, DisplayDomain::AUTO).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn heavier_points_pull_the_line_harder() {
        // Two on-line points plus an off-line point whose weight we crank up.
        let light = [
            obs_w(0.0, 10.0, 1.0),
            obs_w(1.0, 100.0, 1.0),
            obs_w(2.0, 100.0, 1.0),
        ];
        let heavy = [
            obs_w(0.0, 10.0, 1.0),
            obs_w(1.0, 100.0, 1.0),
            obs_w(2.0, 100.0, 100.0),
        ];

        let a = fit_log_linear(&light, DisplayDomain::AUTO).unwrap();
        let b = fit_log_linear(&heavy, DisplayDomain::AUTO).unwrap();

        // The heavy flat tail should drag the slope down.
        assert!(b.slope < a.slope);
    }

    #[test]
    fn end_to_end_unit_slope_scenario() {
        let points = [
            obs_w(0.0, 10.0, 1.0),
            obs_w(1.0, 100.0, 1.0),
            obs_w(2.0, 1000.0, 1.0),
        ];
        let fit = fit_log_linear(&points, DisplayDomain::new(Some(0.0), Some(2.0))).unwrap();

        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.points[0].x, 0.0);
        assert!((fit.points[0].y - 10.0).abs() < 1e-9);
        assert_eq!(fit.points[1].x, 2.0);
        assert!((fit.points[1].y - 1000.0).abs() < 1e-6);
    }
}
