//! Delimited input parsing
//!
//! [`CsvRecordReader`] reads the header once, then turns every following row
//! into a [`Record`] or a [`RowShapeError`] when the field count is off.

pub mod record;
pub mod validation;

pub use record::{Header, Record};

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::conversion::config::DelimiterType;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult, RowShapeError};

/// Result of parsing one data row
#[derive(Debug, Clone)]
pub enum RowOutcome {
    Accepted(Record),
    Rejected(RowShapeError),
}

/// Streaming reader yielding one row at a time.
///
/// The header is parsed in [`CsvRecordReader::new`]; iteration stops after the
/// first fatal error.
pub struct CsvRecordReader<R> {
    inner: csv::Reader<R>,
    header: Header,
    delimiter: DelimiterType,
    rows_read: u64,
    rows_skipped: u64,
    failed: bool,
}

impl<R: Read> CsvRecordReader<R> {
    /// Wrap `source` and read its header row
    pub fn new(source: R, delimiter: DelimiterType) -> ConversionResult<Self> {
        // Field counts are checked per row here, not by the csv crate.
        let mut inner = ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(false)
            .flexible(true)
            .from_reader(source);

        let mut first = StringRecord::new();
        if !inner.read_record(&mut first)? {
            return Err(ConversionError::conversion(ConversionErrorKind::MissingHeader));
        }
        let header = Header::from_record(&first)?;
        debug!(fields = header.len(), delimiter = delimiter.name(), "parsed header");

        Ok(Self {
            inner,
            header,
            delimiter,
            rows_read: 0,
            rows_skipped: 0,
            failed: false,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Data rows read so far, accepted or not
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped
    }

    /// Parse the next data row, `Ok(None)` at end of input
    pub fn read_row(&mut self) -> ConversionResult<Option<RowOutcome>> {
        let mut row = StringRecord::new();
        if !self.inner.read_record(&mut row)? {
            return Ok(None);
        }
        self.rows_read += 1;
        let line = row.position().map_or(0, |p| p.line());

        if row.len() != self.header.len() {
            self.rows_skipped += 1;
            return Ok(Some(RowOutcome::Rejected(RowShapeError {
                line,
                expected: self.header.len(),
                found: row.len(),
                row: self.preview(&row),
            })));
        }

        Ok(Some(RowOutcome::Accepted(Record::new(
            self.header.clone(),
            row,
            line,
        ))))
    }

    fn preview(&self, row: &StringRecord) -> String {
        let separator = (self.delimiter.as_byte() as char).to_string();
        row.iter().collect::<Vec<_>>().join(&separator)
    }
}

impl<R: Read> Iterator for CsvRecordReader<R> {
    type Item = ConversionResult<RowOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_row() {
            Ok(Some(outcome)) => Some(Ok(outcome)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
