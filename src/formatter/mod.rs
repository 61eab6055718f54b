//! Incremental JSON array formatting
//!
//! [`JsonArrayWriter`] owns the output sink and appends one object per
//! record, so the document is never held in memory as a whole.

use std::io::Write;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::parser::Record;

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// The whole array on a single line
    Compact,
    /// One object per element, fields indented by `indent` spaces per level
    Pretty { indent: usize },
}

impl OutputStyle {
    fn line_break(&self) -> &'static [u8] {
        match self {
            OutputStyle::Compact => b"",
            OutputStyle::Pretty { .. } => b"\n",
        }
    }
}

/// Writer lifecycle; no transition goes backwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// `[` written, no element yet
    AwaitingFirst,
    /// At least one element written
    Streaming,
    /// `]` written and the sink flushed
    Closed,
}

/// Streams records into a JSON array on `W`
pub struct JsonArrayWriter<W: Write> {
    sink: W,
    style: OutputStyle,
    state: WriterState,
    scratch: Vec<u8>,
    records_written: u64,
    bytes_written: u64,
}

impl<W: Write> JsonArrayWriter<W> {
    /// Take ownership of `sink` and write the opening bracket
    pub fn begin(sink: W, style: OutputStyle) -> ConversionResult<Self> {
        let mut writer = Self {
            sink,
            style,
            state: WriterState::AwaitingFirst,
            scratch: Vec::with_capacity(256),
            records_written: 0,
            bytes_written: 0,
        };
        writer.emit(b"[")?;
        writer.emit(style.line_break())?;
        Ok(writer)
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Append one record as the next array element
    pub fn write_record(&mut self, record: &Record) -> ConversionResult<()> {
        match self.state {
            WriterState::Closed => {
                return Err(ConversionError::conversion(ConversionErrorKind::WriterClosed))
            }
            WriterState::AwaitingFirst => self.state = WriterState::Streaming,
            WriterState::Streaming => {
                self.emit(b",")?;
                self.emit(self.style.line_break())?;
            }
        }

        self.scratch.clear();
        render_object(&mut self.scratch, record, self.style)?;
        let object = std::mem::take(&mut self.scratch);
        let result = self.emit(&object);
        self.scratch = object;
        result?;

        self.records_written += 1;
        Ok(())
    }

    /// Write the closing bracket and flush
    pub fn close(&mut self) -> ConversionResult<()> {
        if self.state == WriterState::Closed {
            return Err(ConversionError::conversion(ConversionErrorKind::WriterClosed));
        }
        self.emit(self.style.line_break())?;
        self.emit(b"]")?;
        self.sink
            .flush()
            .map_err(|e| ConversionError::io(e, None))?;
        self.state = WriterState::Closed;
        Ok(())
    }

    /// Hand the sink back
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Close the array and hand the sink back
    pub fn finish(mut self) -> ConversionResult<W> {
        self.close()?;
        Ok(self.into_inner())
    }

    fn emit(&mut self, bytes: &[u8]) -> ConversionResult<()> {
        self.sink
            .write_all(bytes)
            .map_err(|e| ConversionError::io(e, None))?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

/// Serialize one record into `buf` as a JSON object.
///
/// Pretty objects sit one level inside the array, so every line gets one
/// extra indent.
pub fn render_object(buf: &mut Vec<u8>, record: &Record, style: OutputStyle) -> ConversionResult<()> {
    match style {
        OutputStyle::Compact => serde_json::to_writer(&mut *buf, record).map_err(serialization),
        OutputStyle::Pretty { indent } => {
            let pad = vec![b' '; indent];
            let mut object = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(
                &mut object,
                PrettyFormatter::with_indent(&pad),
            );
            record.serialize(&mut ser).map_err(serialization)?;

            // Strings are escaped, so every '\n' here is structural.
            for (i, line) in object.split(|b| *b == b'\n').enumerate() {
                if i > 0 {
                    buf.push(b'\n');
                }
                buf.extend_from_slice(&pad);
                buf.extend_from_slice(line);
            }
            Ok(())
        }
    }
}

fn serialization(err: serde_json::Error) -> ConversionError {
    ConversionError::conversion(ConversionErrorKind::Serialization {
        message: err.to_string(),
    })
}
