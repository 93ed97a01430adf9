//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`ExposureKind`, `WeightMode`)
//! - normalized occupation observation points (`OccPoint`)
//! - the regression input/output shapes (`Observation`, `DisplayDomain`,
//!   `RegressionResult`)

pub mod types;

pub use types::*;
