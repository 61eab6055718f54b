//! CSV to JSON Converter
//!
//! A Rust CLI tool for streaming delimited files into JSON arrays. A reader
//! thread parses rows and a writer thread serializes them, connected by a
//! bounded channel, so memory use does not grow with the input.

pub mod cli;
pub mod conversion;
pub mod error;
pub mod formatter;
pub mod parser;

// Re-export commonly used types
pub use conversion::{
    convert_csv_str, ConversionConfig, ConversionEngine, ConversionStatistics, DelimiterType,
};
pub use error::{ConversionError, ConversionErrorKind, ConversionResult, ParseError, RowShapeError};
pub use formatter::{JsonArrayWriter, OutputStyle};
pub use parser::{CsvRecordReader, Header, Record};

/// Convert CSV text to a JSON array with default configuration
pub fn convert_csv(csv: &str) -> Result<String, ConversionError> {
    convert_csv_str(csv, &ConversionConfig::default())
}
