use clap::Parser;
use std::process::ExitCode;

use anyhow::Result;

use csvjson::cli::{self, Args, CliConfig, CliUtils};
use csvjson::conversion::ConversionEngine;
use csvjson::error::ConversionError;

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_logging(args.verbose, args.quiet);
    let verbose = args.verbose;

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ConversionError>() {
                Some(conversion_error) => cli::handle_error(conversion_error, verbose),
                None => CliUtils::show_error(&format!("{:#}", err)),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = CliConfig::from_args(args)?;
    let quiet = config.is_quiet();

    let mut engine = ConversionEngine::new(config.conversion_config.clone());
    let spinner = config.want_progress().then(CliUtils::create_spinner);
    if let Some(pb) = &spinner {
        engine = engine.with_progress(pb.clone());
    }

    let stats = if config.is_validate_only() {
        let result = engine.validate_file(config.input_path());
        if let Some(pb) = &spinner {
            pb.finish_and_clear();
        }
        let stats = result?;
        CliUtils::show_success(
            &format!(
                "{}: {} rows match the header",
                config.input_path().display(),
                stats.records_written
            ),
            quiet,
        );
        stats
    } else {
        CliUtils::show_status("Writing JSON file...", quiet);
        let result = engine.convert_file(config.input_path(), &config.output_path);
        if let Some(pb) = &spinner {
            pb.finish_and_clear();
        }
        let stats = result?;
        CliUtils::show_success(
            &format!(
                "Converted {} -> {}",
                config.input_path().display(),
                config.output_path.display()
            ),
            quiet,
        );
        CliUtils::show_status("Completed!", quiet);
        stats
    };

    if stats.rows_skipped > 0 {
        CliUtils::show_warning(
            &format!("{} rows skipped (field count differs from header)", stats.rows_skipped),
            quiet,
        );
    }

    if config.want_stats() && !quiet {
        cli::output_statistics(&stats, config.args.stats_json)?;
    }

    Ok(())
}
