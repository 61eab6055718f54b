//! CSV to JSON conversion module
//!
//! This module contains the reader/writer pipeline, configuration, and statistics.

pub mod config;
pub mod engine;
pub mod stats;

pub use config::{ConversionConfig, DelimiterType};

pub use engine::{ConversionEngine, ConversionOutput};
pub use stats::ConversionStatistics;

pub use crate::error::ConversionResult;

use crate::error::ConversionError;

/// Convert an in-memory CSV document into a JSON array string
pub fn convert_csv_str(csv: &str, config: &ConversionConfig) -> ConversionResult<String> {
    let engine = ConversionEngine::new(config.clone());
    let output = engine.convert(csv.as_bytes(), Vec::with_capacity(csv.len() * 2))?;
    String::from_utf8(output.sink)
        .map_err(|e| ConversionError::Other(anyhow::anyhow!("output is not UTF-8: {}", e)))
}
