//! Shared "fit pipeline" logic used by all front-end commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load (CSV or sample) -> observations -> log-linear fit -> residuals -> rankings
//!
//! The commands can then focus on presentation (summary vs rankings-only).

use crate::data::generate_sample;
use crate::domain::{FitConfig, Observation, RegressionResult, TrendResidual};
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_occ_points};
use crate::math::fit_log_linear;
use crate::report::Rankings;

/// All computed outputs of a single `wtrend fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub result: RegressionResult,
    pub residuals: Vec<TrendResidual>,
    pub rankings: Rankings,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Load occupation points: CSV when configured, synthetic sample otherwise.
    let ingest = if config.csv_path.is_some() {
        load_occ_points(config)?
    } else {
        let sample = generate_sample(config)?;
        IngestedData::from_points(sample.points, sample.spec, sample.stats)
    };

    // 2) Fit the weighted log-linear trend over the display domain.
    //
    // Inside the library the uncomputable case is an `Option` sentinel; at the
    // pipeline boundary it becomes a plain-language exit-code-3 error.
    let observations: Vec<Observation> = ingest.points.iter().map(|p| p.observation()).collect();
    let result = fit_log_linear(&observations, config.domain).ok_or_else(|| {
        AppError::new(
            3,
            "Trend not computable: need at least two valid occupations with positive wages, \
             non-zero total weight, and more than one distinct exposure value.",
        )
    })?;

    // 3) Compute residuals and rankings.
    let residuals = crate::report::compute_residuals(&ingest.points, &result)?;
    let rankings = crate::report::rank_above_below(&residuals, config.top_n);

    Ok(RunOutput {
        ingest,
        result,
        residuals,
        rankings,
    })
}
