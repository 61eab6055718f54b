//! Configuration options for CSV to JSON conversion

use std::str::FromStr;

use crate::formatter::OutputStyle;

/// Default spaces per indentation level in pretty mode
pub const DEFAULT_INDENT: u8 = 3;

/// Default number of records buffered between reader and writer
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Upper bound on the handoff buffer, keeps memory use bounded
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 16;

/// Field delimiter options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelimiterType {
    /// Comma delimiter (,)
    #[default]
    Comma,
    /// Semicolon delimiter (;)
    Semicolon,
}

impl DelimiterType {
    pub fn as_byte(&self) -> u8 {
        match self {
            DelimiterType::Comma => b',',
            DelimiterType::Semicolon => b';',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DelimiterType::Comma => "comma",
            DelimiterType::Semicolon => "semicolon",
        }
    }
}

impl FromStr for DelimiterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comma" | "," => Ok(DelimiterType::Comma),
            "semicolon" | ";" => Ok(DelimiterType::Semicolon),
            other => Err(format!(
                "Invalid delimiter '{}'. Only comma or semicolon separators are allowed",
                other
            )),
        }
    }
}

/// Conversion configuration options
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Field delimiter of the input
    pub delimiter: DelimiterType,
    /// Pretty-print output (vs a single line)
    pub pretty: bool,
    /// Spaces per indentation level when pretty-printing (0-8)
    pub indent_size: u8,
    /// Records buffered in the handoff channel; 0 makes it a rendezvous
    pub channel_capacity: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            delimiter: DelimiterType::Comma,
            pretty: false,
            indent_size: DEFAULT_INDENT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ConversionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set field delimiter
    pub fn with_delimiter(mut self, delimiter: DelimiterType) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enable/disable pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set indentation size
    pub fn with_indent_size(mut self, size: u8) -> Result<Self, String> {
        if size > 8 {
            return Err("Indent size must be 0-8 spaces".to_string());
        }
        self.indent_size = size;
        Ok(self)
    }

    /// Set handoff channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.indent_size > 8 {
            return Err("Indent size must be 0-8 spaces".to_string());
        }

        if self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(format!(
                "Channel capacity must be at most {}",
                MAX_CHANNEL_CAPACITY
            ));
        }

        Ok(())
    }

    /// Output layout the writer should use
    pub fn output_style(&self) -> OutputStyle {
        if self.pretty {
            OutputStyle::Pretty {
                indent: self.indent_size as usize,
            }
        } else {
            OutputStyle::Compact
        }
    }
}
