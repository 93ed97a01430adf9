//! Reporting utilities: residuals, rankings, and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use chrono::NaiveDate;

use crate::domain::{DatasetStats, FitConfig, OccPoint, RegressionResult, RunSpec, TrendResidual};
use crate::error::AppError;

/// Above/below-trend rankings (top-N each side).
#[derive(Debug, Clone)]
pub struct Rankings {
    pub above: Vec<TrendResidual>,
    pub below: Vec<TrendResidual>,
}

/// Compute fitted wages and log-space residuals for each occupation.
pub fn compute_residuals(
    points: &[OccPoint],
    fit: &RegressionResult,
) -> Result<Vec<TrendResidual>, AppError> {
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        let wage_fit = fit.predict(p.exposure);
        let log_residual = p.wage.log10() - fit.predict_log10(p.exposure);
        if !wage_fit.is_finite() || !log_residual.is_finite() {
            return Err(AppError::new(
                4,
                "Non-finite trend prediction during residual computation.",
            ));
        }
        out.push(TrendResidual {
            point: p.clone(),
            wage_fit,
            log_residual,
        });
    }
    Ok(out)
}

/// Rank the top occupations paid above and below the fitted trend.
pub fn rank_above_below(residuals: &[TrendResidual], top_n: usize) -> Rankings {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.log_residual
            .partial_cmp(&a.log_residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let above = sorted.iter().take(top_n).cloned().collect();

    let mut sorted_below = residuals.to_vec();
    sorted_below.sort_by(|a, b| {
        a.log_residual
            .partial_cmp(&b.log_residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let below = sorted_below.iter().take(top_n).cloned().collect();

    Rankings { above, below }
}

/// Format the full run summary (dataset stats + fit diagnostics).
pub fn format_run_summary(
    stats: &DatasetStats,
    spec: &RunSpec,
    fit: &RegressionResult,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== wtrend - Wage vs. Exposure Trend ===\n");
    out.push_str(&format!("As-of: {}\n", fmt_date(spec.asof_date)));
    out.push_str(&format!("X: {}\n", spec.exposure.display_name()));
    out.push_str(&format!(
        "Points: n={} | exposure=[{:.3}, {:.3}] | wage=[${}, ${}]\n",
        stats.n_points,
        stats.exposure_min,
        stats.exposure_max,
        fmt_thousands(stats.wage_min),
        fmt_thousands(stats.wage_max),
    ));
    out.push_str(&format!(
        "Employment weight: total={}\n",
        fmt_thousands(stats.employment_total)
    ));

    out.push_str("\nTrend (weighted least squares on log10 wage):\n");
    out.push_str(&format!(
        "- slope={:.6} intercept={:.6} R²={:.4}\n",
        fit.slope, fit.intercept, fit.r_squared
    ));
    // 10^(slope/10): multiplicative wage change per +0.1 exposure.
    out.push_str(&format!(
        "- implied wage ratio per +0.1 exposure: {:.4}x\n",
        10f64.powf(fit.slope * 0.1)
    ));
    out.push_str(&format!(
        "- line: ({:.3}, ${}) -> ({:.3}, ${})\n",
        fit.points[0].x,
        fmt_thousands(fit.points[0].y),
        fit.points[1].x,
        fmt_thousands(fit.points[1].y),
    ));
    if fit.r_squared == 0.0 {
        out.push_str("- note: trend explains no wage variance (R² = 0); consider omitting it\n");
    }

    if let Some(edu) = &config.filter_education {
        out.push_str(&format!("\nFilter: education = {edu}\n"));
    }
    out.push('\n');

    out
}

/// Format the above/below-trend tables.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Paid above trend (positive log residual):\n");
    out.push_str(&format_table(&rankings.above));
    out.push('\n');

    out.push_str("Paid below trend (negative log residual):\n");
    out.push_str(&format_table(&rankings.below));

    out
}

fn format_table(rows: &[TrendResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:<30} {:>9} {:>12} {:>12} {:>9}\n",
        "soc_code", "title", "exposure", "wage", "fitted", "premium"
    ));
    out.push_str(&format!(
        "{:-<10} {:-<30} {:-<9} {:-<12} {:-<12} {:-<9}\n",
        "", "", "", "", "", ""
    ));

    for r in rows {
        let p = &r.point;
        out.push_str(&format!(
            "{:<10} {:<30} {:>9.3} {:>12} {:>12} {:>8.1}%\n",
            truncate(&p.soc_code, 10),
            truncate(&p.soc_title, 30),
            p.exposure,
            format!("${}", fmt_thousands(p.wage)),
            format!("${}", fmt_thousands(r.wage_fit)),
            premium_pct(r.log_residual),
        ));
    }

    out
}

/// Convert a log10 residual to a percentage above/below trend.
pub fn premium_pct(log_residual: f64) -> f64 {
    (10f64.powf(log_residual) - 1.0) * 100.0
}

/// Format a number with thousands separators and at most two decimals.
///
/// `1000` -> `1,000`, `1000.12345` -> `1,000.12`, `-1000` -> `-1,000`.
pub fn fmt_thousands(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }

    let negative = v < 0.0;
    let rounded = (v.abs() * 100.0).round() / 100.0;
    let int_part = rounded.trunc();
    let frac_cents = ((rounded - int_part) * 100.0).round() as u32;

    // Group integer digits in threes.
    let digits = format!("{int_part:.0}");
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative && (int_part > 0.0 || frac_cents > 0) {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac_cents > 0 {
        if frac_cents % 10 == 0 {
            out.push_str(&format!(".{}", frac_cents / 10));
        } else {
            out.push_str(&format!(".{frac_cents:02}"));
        }
    }
    out
}

/// Format a date as `Mon D, YYYY` (e.g. `Jan 15, 2024`).
pub fn fmt_date(d: NaiveDate) -> String {
    d.format("%b %-d, %Y").to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrendPoint;

    fn point(code: &str, exposure: f64, wage: f64) -> OccPoint {
        OccPoint {
            soc_code: code.to_string(),
            soc_title: format!("Occupation {code}"),
            exposure,
            wage,
            weight: 1.0,
            education: None,
        }
    }

    fn unit_fit() -> RegressionResult {
        // log10(wage) = 4 + 0 * x: flat $10,000 trend.
        RegressionResult {
            points: [
                TrendPoint { x: 0.0, y: 10_000.0 },
                TrendPoint { x: 1.0, y: 10_000.0 },
            ],
            slope: 0.0,
            intercept: 4.0,
            r_squared: 0.0,
        }
    }

    #[test]
    fn residuals_are_log_space_differences() {
        let points = vec![point("A", 0.2, 10_000.0), point("B", 0.8, 100_000.0)];
        let residuals = compute_residuals(&points, &unit_fit()).unwrap();

        assert_eq!(residuals.len(), 2);
        assert!(residuals[0].log_residual.abs() < 1e-12);
        assert!((residuals[1].log_residual - 1.0).abs() < 1e-12);
        assert!((residuals[1].wage_fit - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn rankings_split_above_and_below() {
        let points = vec![
            point("FLAT", 0.1, 10_000.0),
            point("HIGH", 0.5, 40_000.0),
            point("LOW", 0.9, 2_500.0),
        ];
        let residuals = compute_residuals(&points, &unit_fit()).unwrap();
        let rankings = rank_above_below(&residuals, 1);

        assert_eq!(rankings.above.len(), 1);
        assert_eq!(rankings.above[0].point.soc_code, "HIGH");
        assert_eq!(rankings.below.len(), 1);
        assert_eq!(rankings.below[0].point.soc_code, "LOW");
    }

    #[test]
    fn premium_pct_round_trips_log_residuals() {
        assert!((premium_pct(0.0) - 0.0).abs() < 1e-12);
        // log10(2) above trend = paid 2x = +100%.
        assert!((premium_pct(2f64.log10()) - 100.0).abs() < 1e-9);
        assert!((premium_pct(-(2f64.log10())) - (-50.0)).abs() < 1e-9);
    }

    #[test]
    fn fmt_thousands_groups_integers() {
        assert_eq!(fmt_thousands(1000.0), "1,000");
        assert_eq!(fmt_thousands(0.0), "0");
        assert_eq!(fmt_thousands(-1000.0), "-1,000");
        assert_eq!(fmt_thousands(1_234_567.0), "1,234,567");
    }

    #[test]
    fn fmt_thousands_truncates_to_two_decimals() {
        assert_eq!(fmt_thousands(1000.12345), "1,000.12");
        assert_eq!(fmt_thousands(1000.5), "1,000.5");
        assert_eq!(fmt_thousands(-0.25), "-0.25");
    }

    #[test]
    fn fmt_date_is_short_month_day_year() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(fmt_date(d), "Jan 15, 2024");

        let d = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(fmt_date(d), "Dec 25, 2024");

        // Leap day formats like any other date.
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(fmt_date(d), "Feb 29, 2024");
    }

    #[test]
    fn summary_flags_zero_variance_trends() {
        let stats = DatasetStats {
            n_points: 3,
            exposure_min: 0.1,
            exposure_max: 0.9,
            wage_min: 10_000.0,
            wage_max: 10_000.0,
            employment_total: 3.0,
        };
        let spec = RunSpec {
            asof_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            exposure: crate::domain::ExposureKind::Human,
        };
        let config = FitConfig {
            csv_path: None,
            asof_date: spec.asof_date,
            exposure_axis: crate::domain::ExposureAxis::Auto,
            weight_mode: crate::domain::WeightMode::Auto,
            domain: crate::domain::DisplayDomain::AUTO,
            filter_education: None,
            sample_count: 0,
            sample_seed: 0,
            sample_noise: 0.0,
            top_n: 5,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_trend: None,
            grid_points: 64,
        };

        let summary = format_run_summary(&stats, &spec, &unit_fit(), &config);
        assert!(summary.contains("explains no wage variance"));
        assert!(summary.contains("Jun 1, 2025"));
    }
}
