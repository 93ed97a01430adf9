//! Data sources: deterministic synthetic occupation samples.

pub mod sample;

pub use sample::*;
