//! Export per-occupation results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{RunSpec, TrendResidual};
use crate::error::AppError;
use crate::report::premium_pct;

/// Write per-occupation results to a CSV file.
pub fn write_results_csv(
    path: &Path,
    residuals: &[TrendResidual],
    spec: &RunSpec,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(
        file,
        "soc_code,soc_title,asof_date,exposure_kind,exposure,median_annual_wage,wage_fit,log_residual,premium_pct,weight,education"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        let p = &r.point;
        let exposure_kind = format!("{:?}", spec.exposure).to_lowercase();
        writeln!(
            file,
            "{},{},{},{},{:.10},{:.2},{:.2},{:.10},{:.4},{:.10},{}",
            p.soc_code,
            csv_quote(&p.soc_title),
            spec.asof_date,
            exposure_kind,
            p.exposure,
            p.wage,
            r.wage_fit,
            r.log_residual,
            premium_pct(r.log_residual),
            p.weight,
            csv_quote(p.education.as_deref().unwrap_or("")),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote a free-text field when it contains CSV metacharacters.
fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
