//! Input/output: CSV ingest, result exports, saved trend files.

pub mod export;
pub mod ingest;
pub mod trend;
