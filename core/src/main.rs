use cinecat_core::cli::{Cli, InfoFormat};
use cinecat_core::{convert, summarize, CinecatError, Result, SeriesSummary, TextReport};
use clap::Parser;
use log::error;
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match cli.info {
        Some(format) => {
            let summaries = summarize(&cli.dcm_path, &cli.pattern)?;
            print_summaries(&summaries, format)
        }
        None => {
            convert(&cli.dcm_path, &cli.convert_options())?;
            Ok(())
        }
    }
}

fn print_summaries(summaries: &[SeriesSummary], format: InfoFormat) -> Result<()> {
    match format {
        InfoFormat::Text => {
            for summary in summaries {
                println!("{}", TextReport::new(summary));
            }
            Ok(())
        }
        InfoFormat::Json => output_json(summaries),
    }
}

#[cfg(feature = "json")]
fn output_json(summaries: &[SeriesSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(summaries)
        .map_err(|e| CinecatError::EncodeError(format!("JSON serialization failed: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[cfg(not(feature = "json"))]
fn output_json(_summaries: &[SeriesSummary]) -> Result<()> {
    Err(CinecatError::InvalidArgument(
        "JSON output requires the 'json' feature (cargo build --features json)".to_string(),
    ))
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
