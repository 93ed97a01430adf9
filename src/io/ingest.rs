//! CSV ingest and normalization.
//!
//! This module is responsible for turning an occupation-level CSV into a clean
//! set of `(exposure, wage, weight, metadata)` points that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;

use csv::StringRecord;

use crate::domain::{
    DatasetStats, ExposureAxis, ExposureKind, FitConfig, OccPoint, OccRow, RunSpec, WeightMode,
};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub soc_code: Option<String>,
    pub message: String,
}

/// Ingest output: normalized points + resolved spec + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub points: Vec<OccPoint>,
    pub spec: RunSpec,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    /// Wrap an already-normalized point set (e.g., a synthetic sample).
    pub fn from_points(points: Vec<OccPoint>, spec: RunSpec, stats: DatasetStats) -> Self {
        let rows_used = points.len();
        Self {
            points,
            spec,
            stats,
            row_errors: Vec::new(),
            rows_read: rows_used,
            rows_used,
        }
    }
}

/// Load and normalize CSV to `OccPoint`s, applying filters.
pub fn load_occ_points(config: &FitConfig) -> Result<IngestedData, AppError> {
    let Some(csv_path) = &config.csv_path else {
        return Err(AppError::new(2, "No CSV path configured for ingest."));
    };

    let file = File::open(csv_path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", csv_path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);

    // Resolve `--exposure auto` to an actual exposure kind based on columns.
    let exposure = resolve_exposure_kind(config.exposure_axis, &header_map)?;

    // If the user supplied filters that require columns, validate them early.
    if config.filter_education.is_some() && !header_map.contains_key("education") {
        return Err(AppError::new(
            2,
            "Filter `--education` requires an `education` column in the CSV.",
        ));
    }

    ensure_required_columns_exist(exposure, &header_map)?;

    let spec = RunSpec {
        asof_date: config.asof_date,
        exposure,
    };

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    soc_code: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => match normalize_row(&row, exposure, config) {
                Ok(Some(point)) => points.push(point),
                Ok(None) => {} // filtered out
                Err(e) => row_errors.push(RowError {
                    line,
                    soc_code: Some(row.soc_code),
                    message: e,
                }),
            },
            Err(e) => row_errors.push(RowError {
                line,
                soc_code: None,
                message: e,
            }),
        }
    }

    let rows_used = points.len();
    if rows_used == 0 {
        return Err(AppError::new(
            3,
            "No valid rows remain after normalization/filtering.",
        ));
    }

    let stats = DatasetStats::from_points(&points).ok_or_else(|| {
        AppError::new(3, "No valid points remain after normalization/filtering.")
    })?;

    Ok(IngestedData {
        points,
        spec,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿soc_code"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_exposure_kind(
    axis: ExposureAxis,
    header_map: &HashMap<String, usize>,
) -> Result<ExposureKind, AppError> {
    if let Some(kind) = axis.to_kind() {
        return Ok(kind);
    }

    // Auto resolution: human-rated score > model-derived score.
    if header_map.contains_key(ExposureKind::Human.column_name()) {
        return Ok(ExposureKind::Human);
    }
    if header_map.contains_key(ExposureKind::Dv.column_name()) {
        return Ok(ExposureKind::Dv);
    }

    Err(AppError::new(
        2,
        "Could not resolve `--exposure auto`: neither `exposure_human_gamma` nor `exposure_dv_gamma` columns were found.",
    ))
}

fn ensure_required_columns_exist(
    exposure: ExposureKind,
    header_map: &HashMap<String, usize>,
) -> Result<(), AppError> {
    if !header_map.contains_key("soc_code") {
        return Err(AppError::new(2, "Missing required column: `soc_code`"));
    }
    if !header_map.contains_key("median_annual_wage") {
        return Err(AppError::new(
            2,
            "Missing required column: `median_annual_wage`",
        ));
    }
    if !header_map.contains_key(exposure.column_name()) {
        let flag = match exposure {
            ExposureKind::Human => "human",
            ExposureKind::Dv => "dv",
        };
        return Err(AppError::new(
            2,
            format!(
                "Missing required column for `--exposure {flag}`: `{}`",
                exposure.column_name()
            ),
        ));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<OccRow, String> {
    let soc_code = get_required(record, header_map, "soc_code")?.to_string();
    let soc_title = get_optional(record, header_map, "soc_title").map(str::to_string);

    let employment = parse_opt_f64(get_optional(record, header_map, "employment"));
    let median_annual_wage =
        parse_opt_f64(get_optional(record, header_map, "median_annual_wage"));

    let exposure_human = parse_opt_f64(get_optional(
        record,
        header_map,
        ExposureKind::Human.column_name(),
    ));
    let exposure_dv = parse_opt_f64(get_optional(
        record,
        header_map,
        ExposureKind::Dv.column_name(),
    ));

    let education = get_optional(record, header_map, "education").map(str::to_string);

    Ok(OccRow {
        soc_code,
        soc_title,
        employment,
        median_annual_wage,
        exposure_human,
        exposure_dv,
        education,
    })
}

fn normalize_row(
    row: &OccRow,
    exposure_kind: ExposureKind,
    config: &FitConfig,
) -> Result<Option<OccPoint>, String> {
    // 1) Choose the exposure score for the x-axis.
    let exposure = match exposure_kind {
        ExposureKind::Human => row
            .exposure_human
            .ok_or_else(|| "Missing/invalid `exposure_human_gamma` value.".to_string())?,
        ExposureKind::Dv => row
            .exposure_dv
            .ok_or_else(|| "Missing/invalid `exposure_dv_gamma` value.".to_string())?,
    };

    // 2) Validate the wage. The regression runs on log10(wage), so non-positive
    //    wages can never be fitted; reject them at row level with a message
    //    rather than dropping them without a trace.
    let wage = row
        .median_annual_wage
        .ok_or_else(|| "Missing/invalid `median_annual_wage` value.".to_string())?;
    if wage <= 0.0 {
        return Err("Non-positive `median_annual_wage` (log-scale fit requires wage > 0).".to_string());
    }

    // 3) Apply bucket filters (case-insensitive).
    if !matches_filter(row.education.as_deref(), config.filter_education.as_deref()) {
        return Ok(None);
    }

    // 4) Resolve the observation weight used in the fit objective.
    let weight = resolve_weight(row, config.weight_mode);

    Ok(Some(OccPoint {
        soc_code: row.soc_code.clone(),
        soc_title: row
            .soc_title
            .clone()
            .unwrap_or_else(|| row.soc_code.clone()),
        exposure,
        wage,
        weight,
        education: row.education.clone(),
    }))
}

fn matches_filter(value: Option<&str>, filter: Option<&str>) -> bool {
    let Some(filter) = filter else { return true };
    let Some(value) = value else { return false };
    value.trim().eq_ignore_ascii_case(filter.trim())
}

fn resolve_weight(row: &OccRow, mode: WeightMode) -> f64 {
    // Rows without an employment figure count as 1 (the same default the
    // regression core applies for absent weights). Negative employment is left
    // untouched here; the core clamps weights to >= 0.
    match mode {
        WeightMode::Uniform => 1.0,
        WeightMode::Employment | WeightMode::Auto => row.employment.unwrap_or(1.0),
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
