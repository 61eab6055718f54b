//! Command-line interface module

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::conversion::config::{ConversionConfig, DelimiterType, DEFAULT_INDENT};
use crate::conversion::{ConversionResult, ConversionStatistics};
use crate::error::ConversionError;
use crate::parser::validation::{is_same_path, validate_input_path};

pub mod path_mapping;

/// Main CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "csvjson")]
#[command(about = "Convert a CSV file to a JSON array of objects")]
#[command(version = "0.1.0")]
#[command(long_about = None)]
pub struct Args {
    /// Input CSV file
    #[arg()]
    pub input: PathBuf,

    /// Output file path (default: input path with a .json extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Column delimiter: comma or semicolon (default: comma)
    #[arg(short, long, alias = "separator")]
    pub delimiter: Option<Delimiter>,

    /// Generate pretty JSON
    #[arg(long)]
    pub pretty: bool,

    /// Spaces per indentation level with --pretty (0-8, default: 3)
    #[arg(long)]
    pub indent: Option<u8>,

    /// Records buffered between reader and writer (0 for a rendezvous channel)
    #[arg(long)]
    pub channel_capacity: Option<usize>,

    /// Only check rows against the header, don't write output
    #[arg(long)]
    pub validate_only: bool,

    /// Output conversion statistics
    #[arg(long)]
    pub stats: bool,

    /// Output conversion statistics as JSON
    #[arg(long)]
    pub stats_json: bool,

    /// Show a spinner with the number of records written
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Delimiter types for CLI
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Delimiter {
    #[value(name = "comma", alias = ",")]
    Comma,
    #[value(name = "semicolon", alias = ";")]
    Semicolon,
}

impl From<Delimiter> for DelimiterType {
    fn from(delimiter: Delimiter) -> Self {
        match delimiter {
            Delimiter::Comma => DelimiterType::Comma,
            Delimiter::Semicolon => DelimiterType::Semicolon,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub args: Args,
    pub conversion_config: ConversionConfig,
    pub output_path: PathBuf,
}

impl CliConfig {
    /// Create CLI configuration from arguments.
    ///
    /// Fails before anything is written if the input is missing, not a
    /// `.csv` file, or the options are out of range.
    pub fn from_args(args: Args) -> ConversionResult<Self> {
        let conversion_config = Self::create_conversion_config(&args)?;
        validate_input_path(&args.input)?;

        let output_path =
            path_mapping::resolve_output_path(&args.input, args.output.as_deref());
        if is_same_path(&output_path, &args.input) {
            return Err(ConversionError::configuration(format!(
                "Output path {} would overwrite the input",
                output_path.display()
            )));
        }

        Ok(Self {
            args,
            conversion_config,
            output_path,
        })
    }

    /// Create conversion configuration from CLI arguments
    fn create_conversion_config(args: &Args) -> ConversionResult<ConversionConfig> {
        let mut config = ConversionConfig::new()
            .with_delimiter(args.delimiter.map(DelimiterType::from).unwrap_or_default())
            .with_pretty(args.pretty)
            .with_indent_size(args.indent.unwrap_or(DEFAULT_INDENT))
            .map_err(ConversionError::configuration)?;
        if let Some(capacity) = args.channel_capacity {
            config = config.with_channel_capacity(capacity);
        }

        config.validate().map_err(ConversionError::configuration)?;

        Ok(config)
    }

    pub fn input_path(&self) -> &std::path::Path {
        &self.args.input
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.args.quiet
    }

    /// Check if stats output is requested
    pub fn want_stats(&self) -> bool {
        self.args.stats || self.args.stats_json
    }

    /// Check if only validation is requested
    pub fn is_validate_only(&self) -> bool {
        self.args.validate_only
    }

    pub fn want_progress(&self) -> bool {
        self.args.progress && !self.args.quiet
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// CLI utilities and helpers
pub struct CliUtils;

impl CliUtils {
    /// Format a file size in human-readable format
    pub fn format_file_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.1} {}", size, UNITS[unit_index])
        }
    }

    /// Format a duration in human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_millis = duration.as_millis();

        if total_millis < 1000 {
            format!("{}ms", total_millis)
        } else if total_millis < 60_000 {
            format!("{:.1}s", total_millis as f64 / 1000.0)
        } else {
            let minutes = total_millis / 60_000;
            let seconds = (total_millis % 60_000) / 1000;
            format!("{}m {}s", minutes, seconds)
        }
    }

    /// Create a spinner that counts written records
    pub fn create_spinner() -> indicatif::ProgressBar {
        let pb = indicatif::ProgressBar::new_spinner();
        let style = indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} records {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Show a status line (if not in quiet mode)
    pub fn show_status(message: &str, quiet: bool) {
        if !quiet {
            println!("{}", message);
        }
    }

    /// Show a success message (if not in quiet mode)
    pub fn show_success(message: &str, quiet: bool) {
        if !quiet {
            println!("{} {}", console::style("✓").green(), message);
        }
    }

    /// Show an error message
    pub fn show_error(message: &str) {
        eprintln!("{} {}", console::style("✗").red(), message);
    }

    /// Show a warning message (if not in quiet mode)
    pub fn show_warning(message: &str, quiet: bool) {
        if !quiet {
            eprintln!("{} {}", console::style("⚠").yellow(), message);
        }
    }
}

/// Print conversion statistics in the requested format
pub fn output_statistics(stats: &ConversionStatistics, as_json: bool) -> ConversionResult<()> {
    if as_json {
        let json = stats
            .to_json()
            .map_err(|e| ConversionError::Other(anyhow::Error::new(e)))?;
        println!("{}", json);
        return Ok(());
    }

    println!("\nConversion Statistics:");
    println!("Header fields: {}", stats.header_fields);
    println!("Rows read: {}", stats.rows_read);
    println!("Records written: {}", stats.records_written);
    println!("Rows skipped: {}", stats.rows_skipped);
    if !stats.skipped_lines.is_empty() {
        let lines: Vec<String> = stats.skipped_lines.iter().map(u64::to_string).collect();
        println!("Skipped lines: {}", lines.join(", "));
    }
    println!(
        "Output size: {}",
        CliUtils::format_file_size(stats.output_size_bytes)
    );
    println!(
        "Processing time: {}",
        CliUtils::format_duration(Duration::from_millis(stats.processing_time_ms))
    );
    Ok(())
}

/// Handle CLI errors with a one-line message
pub fn handle_error(error: &ConversionError, verbose: bool) {
    CliUtils::show_error(&error.user_message());

    if verbose {
        if let ConversionError::Conversion {
            source: Some(source),
            ..
        } = error
        {
            eprintln!("  caused by: {:#}", source);
        }
        eprintln!("\nTry 'csvjson --help' for usage information.");
    }
}
