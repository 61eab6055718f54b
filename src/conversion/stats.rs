//! Statistics collected from a conversion run

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Only the first skipped line numbers are kept, so memory stays bounded
pub const MAX_RECORDED_SKIPS: usize = 100;

/// What the reader thread reports once input is exhausted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderReport {
    pub header_fields: usize,
    pub rows_read: u64,
    pub rows_skipped: u64,
    pub skipped_lines: Vec<u64>,
}

impl ReaderReport {
    pub fn new(header_fields: usize) -> Self {
        Self {
            header_fields,
            ..Default::default()
        }
    }

    pub fn record_skip(&mut self, line: u64) {
        self.rows_skipped += 1;
        if self.skipped_lines.len() < MAX_RECORDED_SKIPS {
            self.skipped_lines.push(line);
        }
    }
}

/// Performance statistics for a conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStatistics {
    /// Fields in the header row
    pub header_fields: usize,
    /// Data rows read, header excluded
    pub rows_read: u64,
    /// JSON objects written
    pub records_written: u64,
    /// Rows rejected for a field count mismatch
    pub rows_skipped: u64,
    /// Line numbers of the first rejected rows
    pub skipped_lines: Vec<u64>,
    /// Output size in bytes
    pub output_size_bytes: u64,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Rows processed per second
    pub throughput_rows_per_sec: f32,
    /// Timestamp of when statistics were collected
    pub collected_at: chrono::DateTime<chrono::Utc>,
}

impl ConversionStatistics {
    /// Merge the reader's and writer's view of a finished run
    pub fn from_reports(
        reader: ReaderReport,
        records_written: u64,
        output_size_bytes: u64,
        processing_time: Duration,
    ) -> Self {
        let throughput_rows_per_sec = if processing_time.as_secs_f64() > 0.0 {
            reader.rows_read as f64 / processing_time.as_secs_f64()
        } else {
            0.0
        } as f32;

        Self {
            header_fields: reader.header_fields,
            rows_read: reader.rows_read,
            records_written,
            rows_skipped: reader.rows_skipped,
            skipped_lines: reader.skipped_lines,
            output_size_bytes,
            processing_time_ms: processing_time.as_millis() as u64,
            throughput_rows_per_sec,
            collected_at: chrono::Utc::now(),
        }
    }

    /// Get a formatted summary
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} of {} rows ({} skipped) in {:.1}s - {:.0} rows/s",
            self.records_written,
            self.rows_read,
            self.rows_skipped,
            self.processing_time_ms as f32 / 1000.0,
            self.throughput_rows_per_sec
        )
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
