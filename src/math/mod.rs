//! Mathematical core: weighted log-linear regression.

pub mod regression;

pub use regression::*;
