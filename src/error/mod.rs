//! Error types and handling infrastructure for CSV to JSON conversion

use anyhow::Error;
use std::fmt;
use std::path::PathBuf;

/// Core error types for the conversion process
#[derive(Debug, thiserror::Error)]
pub enum ConversionErrorKind {
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("File {} does not exist", path.display())]
    InputNotFound { path: PathBuf },

    #[error("File {} is not CSV", path.display())]
    NotCsv { path: PathBuf },

    #[error("Path {} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("Missing header row")]
    MissingHeader,

    #[error("Duplicate header field '{name}'")]
    DuplicateHeader { name: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("JSON serialization error: {message}")]
    Serialization { message: String },

    #[error("JSON writer is already closed")]
    WriterClosed,

    #[error("Record channel closed before the reader finished")]
    ChannelClosed,

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("{worker} thread panicked")]
    WorkerPanicked { worker: &'static str },
}

impl ConversionErrorKind {
    pub fn io(message: String, path: Option<PathBuf>) -> Self {
        Self::Io { message, path }
    }

    pub fn configuration(message: String) -> Self {
        Self::Configuration { message }
    }
}

/// Main error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error("{kind}")]
    Conversion {
        kind: ConversionErrorKind,
        source: Option<anyhow::Error>,
    },

    #[error(transparent)]
    Other(#[from] Error),
}

impl ConversionError {
    pub fn parse(message: String, location: Option<(u64, u64)>) -> Self {
        Self::ParseError(ParseError::new(message, location))
    }

    pub fn conversion(kind: ConversionErrorKind) -> Self {
        Self::Conversion { kind, source: None }
    }

    pub fn conversion_with_source(kind: ConversionErrorKind, source: anyhow::Error) -> Self {
        Self::Conversion {
            kind,
            source: Some(source),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::conversion(ConversionErrorKind::configuration(message.into()))
    }

    /// Wrap an I/O failure, remembering the path it happened on
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let message = match &path {
            Some(p) => format!("{}: {}", p.display(), err),
            None => err.to_string(),
        };
        Self::conversion_with_source(ConversionErrorKind::io(message, path), err.into())
    }

    /// The kind, if this is a `Conversion` error
    pub fn kind(&self) -> Option<&ConversionErrorKind> {
        match self {
            Self::Conversion { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// True for errors that only exist because the other side of the
    /// pipeline failed first.
    pub fn is_secondary(&self) -> bool {
        matches!(
            self.kind(),
            Some(ConversionErrorKind::Cancelled) | Some(ConversionErrorKind::ChannelClosed)
        )
    }

    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::ParseError(err) => format!("CSV parse error: {}", err),
            Self::Conversion { kind, .. } => match kind {
                ConversionErrorKind::InputNotFound { path } => {
                    format!("File {} does not exist", path.display())
                }
                ConversionErrorKind::NotCsv { path } => {
                    format!("File {} is not CSV", path.display())
                }
                ConversionErrorKind::MissingHeader => {
                    "Input has no header row".to_string()
                }
                _ => self.to_string(),
            },
            Self::Other(err) => {
                format!("Unexpected error: {}", err)
            }
        }
    }
}

impl From<csv::Error> for ConversionError {
    fn from(err: csv::Error) -> Self {
        let location = err.position().map(|p| (p.line(), p.record()));
        match err.into_kind() {
            csv::ErrorKind::Io(io) => Self::io(io, None),
            csv::ErrorKind::Utf8 { err, .. } => {
                Self::parse(format!("invalid UTF-8 in field {}", err.field() + 1), location)
            }
            other => Self::parse(format!("{:?}", other), location),
        }
    }
}

/// Delimited-format parsing errors
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    /// `(line, record)`, both 1-based line and 0-based record index
    pub location: Option<(u64, u64)>,
}

impl ParseError {
    pub fn new(message: String, location: Option<(u64, u64)>) -> Self {
        Self { message, location }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some((line, _)) = self.location {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// A data row rejected because its field count differs from the header's.
///
/// This is the only recoverable error: the row is reported and skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Line {line}: expected {expected} fields, found {found}. Skipping: {row}")]
pub struct RowShapeError {
    pub line: u64,
    pub expected: usize,
    pub found: usize,
    pub row: String,
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;
