//! Reader/writer pipeline
//!
//! The reader thread parses rows and pushes accepted records onto a bounded
//! channel; the writer thread drains it into the JSON array. Dropping the
//! sender is the end-of-stream marker. The writer reports its outcome on a
//! separate one-shot channel once the sink is flushed and released.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::conversion::config::ConversionConfig;
use crate::conversion::stats::{ConversionStatistics, ReaderReport};
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::formatter::{JsonArrayWriter, OutputStyle};
use crate::parser::validation::{is_same_path, validate_input_path};
use crate::parser::{CsvRecordReader, Record, RowOutcome};

/// Set by whichever side of the pipeline fails first
#[derive(Debug, Default)]
struct CancelToken(AtomicBool);

impl CancelToken {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the writer thread hands back on the completion channel
struct WriterReport<W> {
    sink: W,
    records_written: u64,
    bytes_written: u64,
}

type PipelineOutcomes<W> =
    ConversionResult<(ConversionResult<ReaderReport>, ConversionResult<WriterReport<W>>)>;

/// Result of converting into a caller-supplied sink
#[derive(Debug)]
pub struct ConversionOutput<W> {
    pub sink: W,
    pub stats: ConversionStatistics,
}

/// Main conversion engine
pub struct ConversionEngine {
    config: ConversionConfig,
    progress: Option<ProgressBar>,
}

impl ConversionEngine {
    /// Create a new conversion engine
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Tick `progress` once per record written
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stream delimited `source` into a JSON array on `sink`
    pub fn convert<R, W>(&self, source: R, sink: W) -> ConversionResult<ConversionOutput<W>>
    where
        R: Read + Send,
        W: Write + Send,
    {
        let reader = CsvRecordReader::new(source, self.config.delimiter)?;
        self.run_pipeline(reader, sink)
    }

    /// Convert the file at `input` into a new file at `output`.
    ///
    /// The header is read before `output` is created. On any failure after
    /// that the partial output file is removed.
    pub fn convert_file(&self, input: &Path, output: &Path) -> ConversionResult<ConversionStatistics> {
        validate_input_path(input)?;
        if is_same_path(input, output) {
            return Err(ConversionError::configuration(format!(
                "Output path {} is the input file",
                output.display()
            )));
        }

        let source =
            File::open(input).map_err(|e| ConversionError::io(e, Some(input.to_path_buf())))?;
        let reader = CsvRecordReader::new(BufReader::new(source), self.config.delimiter)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ConversionError::io(e, Some(parent.to_path_buf())))?;
        }
        let file =
            File::create(output).map_err(|e| ConversionError::io(e, Some(output.to_path_buf())))?;
        debug!(input = %input.display(), output = %output.display(), "starting conversion");

        match self.run_pipeline(reader, BufWriter::new(file)) {
            Ok(done) => Ok(done.stats),
            Err(err) => {
                if let Err(e) = fs::remove_file(output) {
                    warn!(output = %output.display(), error = %e, "could not remove partial output");
                }
                Err(err)
            }
        }
    }

    /// Parse every row and check its shape without writing anything
    pub fn validate<R: Read>(&self, source: R) -> ConversionResult<ConversionStatistics> {
        let start = Instant::now();
        let reader = CsvRecordReader::new(source, self.config.delimiter)?;
        let mut accepted = 0u64;
        let report = read_rows(reader, None, |_| {
            accepted += 1;
            Ok(())
        })?;
        Ok(ConversionStatistics::from_reports(
            report,
            accepted,
            0,
            start.elapsed(),
        ))
    }

    pub fn validate_file(&self, input: &Path) -> ConversionResult<ConversionStatistics> {
        validate_input_path(input)?;
        let source =
            File::open(input).map_err(|e| ConversionError::io(e, Some(input.to_path_buf())))?;
        self.validate(BufReader::new(source))
    }

    fn run_pipeline<R, W>(
        &self,
        reader: CsvRecordReader<R>,
        sink: W,
    ) -> ConversionResult<ConversionOutput<W>>
    where
        R: Read + Send,
        W: Write + Send,
    {
        let start = Instant::now();
        let style = self.config.output_style();
        let progress = self.progress.clone();
        let cancel = CancelToken::default();
        let (record_tx, record_rx) = channel::bounded::<Record>(self.config.channel_capacity);
        let (done_tx, done_rx) = channel::bounded::<ConversionResult<WriterReport<W>>>(1);

        let (reader_outcome, writer_outcome) = thread::scope(|scope| -> PipelineOutcomes<W> {
            let cancel = &cancel;
            let reader_thread = thread::Builder::new()
                .name("csv-reader".to_string())
                .spawn_scoped(scope, move || produce(reader, record_tx, cancel))
                .map_err(|e| ConversionError::io(e, None))?;
            let writer_thread = thread::Builder::new()
                .name("json-writer".to_string())
                .spawn_scoped(scope, move || {
                    let outcome = consume(sink, record_rx, style, cancel, progress.as_ref());
                    let _ = done_tx.send(outcome);
                })
                .map_err(|e| ConversionError::io(e, None))?;

            let writer_outcome = done_rx
                .recv()
                .unwrap_or_else(|_| Err(panicked("json-writer")));
            let writer_outcome = match writer_thread.join() {
                Ok(()) => writer_outcome,
                Err(_) => Err(panicked("json-writer")),
            };
            let reader_outcome = reader_thread
                .join()
                .unwrap_or_else(|_| Err(panicked("csv-reader")));
            Ok((reader_outcome, writer_outcome))
        })?;

        let (report, written) = match (reader_outcome, writer_outcome) {
            (Ok(report), Ok(written)) => (report, written),
            (Err(r), Err(w)) if r.is_secondary() && !w.is_secondary() => return Err(w),
            (Err(r), _) => return Err(r),
            (Ok(_), Err(w)) => return Err(w),
        };

        let stats = ConversionStatistics::from_reports(
            report,
            written.records_written,
            written.bytes_written,
            start.elapsed(),
        );
        info!(
            records = stats.records_written,
            skipped = stats.rows_skipped,
            bytes = stats.output_size_bytes,
            "conversion finished"
        );

        Ok(ConversionOutput {
            sink: written.sink,
            stats,
        })
    }
}

/// Reader thread body. Dropping `tx` on return closes the channel.
fn produce<R: Read>(
    reader: CsvRecordReader<R>,
    tx: Sender<Record>,
    cancel: &CancelToken,
) -> ConversionResult<ReaderReport> {
    let result = read_rows(reader, Some(cancel), |record| {
        tx.send(record)
            .map_err(|_| ConversionError::conversion(ConversionErrorKind::ChannelClosed))
    });
    if result.is_err() {
        cancel.cancel();
    }
    // The token must be visible before the writer sees the channel close.
    drop(tx);
    result
}

/// Writer thread body. Dropping `rx` on return unblocks a waiting reader.
fn consume<W: Write>(
    sink: W,
    rx: Receiver<Record>,
    style: OutputStyle,
    cancel: &CancelToken,
    progress: Option<&ProgressBar>,
) -> ConversionResult<WriterReport<W>> {
    let result = drain(sink, &rx, style, cancel, progress);
    if result.is_err() {
        cancel.cancel();
    }
    drop(rx);
    result
}

fn drain<W: Write>(
    sink: W,
    rx: &Receiver<Record>,
    style: OutputStyle,
    cancel: &CancelToken,
    progress: Option<&ProgressBar>,
) -> ConversionResult<WriterReport<W>> {
    let mut writer = JsonArrayWriter::begin(sink, style)?;
    debug!(?style, "writing JSON array");

    for record in rx.iter() {
        writer.write_record(&record)?;
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    // The channel also closes when the reader fails; leave the array open then.
    if cancel.is_cancelled() {
        return Err(ConversionError::conversion(ConversionErrorKind::Cancelled));
    }

    writer.close()?;
    let records_written = writer.records_written();
    let bytes_written = writer.bytes_written();
    Ok(WriterReport {
        sink: writer.into_inner(),
        records_written,
        bytes_written,
    })
}

/// Drive `reader` to the end, handing accepted records to `emit` and
/// reporting rejected ones. Stops before the next row once `cancel` is set.
fn read_rows<R, F>(
    mut reader: CsvRecordReader<R>,
    cancel: Option<&CancelToken>,
    mut emit: F,
) -> ConversionResult<ReaderReport>
where
    R: Read,
    F: FnMut(Record) -> ConversionResult<()>,
{
    let mut report = ReaderReport::new(reader.header().len());

    for outcome in reader.by_ref() {
        if cancel.map_or(false, CancelToken::is_cancelled) {
            return Err(ConversionError::conversion(ConversionErrorKind::Cancelled));
        }
        match outcome? {
            RowOutcome::Accepted(record) => emit(record)?,
            RowOutcome::Rejected(rejected) => {
                warn!(
                    line = rejected.line,
                    expected = rejected.expected,
                    found = rejected.found,
                    row = %rejected.row,
                    "row doesn't match header format, skipping"
                );
                report.record_skip(rejected.line);
            }
        }
    }

    report.rows_read = reader.rows_read();
    debug!(
        rows = report.rows_read,
        skipped = report.rows_skipped,
        "input exhausted"
    );
    Ok(report)
}

fn panicked(worker: &'static str) -> ConversionError {
    ConversionError::conversion(ConversionErrorKind::WorkerPanicked { worker })
}
