//! Reporting: residuals, above/below-trend rankings, and terminal formatting.

pub mod format;

pub use format::*;
