//! # Headline Scraper
//!
//! Command-line front end: runs one extraction over the configured sources,
//! prints the headlines (or the full report as JSON), and optionally writes
//! a timestamped JSON/CSV export.
//!
//! ## Usage
//!
//! ```sh
//! headline_scraper -k climate -f csv -o ./data
//! ```

use clap::Parser;
use headline_scraper::outputs::write_export;
use headline_scraper::{HeadlineExtractor, HeadlineReport, ScraperConfig, SourceOutcome};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("headline_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    args.apply_overrides(&mut config);

    if args.list_sources {
        for source in &config.sources {
            println!("{:<6} {:<18} {}", source.key, source.name, source.base_url);
        }
        return Ok(());
    }

    let extractor = HeadlineExtractor::new(config)?;
    let report = if args.sources.is_empty() {
        extractor.get_headlines(args.keyword()).await
    } else {
        extractor.get_headlines_from(&args.sources, args.keyword()).await
    };

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(dir) = &args.output_dir {
        match write_export(dir, args.format, &report.records()).await {
            Ok(Some(path)) => info!(path = %path.display(), "Export written"),
            Ok(None) => warn!("No headlines found; nothing exported"),
            Err(e) => {
                error!(path = %dir.display(), error = %e, "Failed to write export");
                return Err(e.into());
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Headlines grouped by source, with an inline notice for sources that failed.
fn print_report(report: &HeadlineReport) {
    for source in &report.sources {
        match &source.outcome {
            SourceOutcome::Ok { headlines } => {
                println!("== {} ({} headlines)", source.name, headlines.len());
                for headline in headlines {
                    match &headline.timestamp {
                        Some(ts) => println!("  - {} [{}]\n    {}", headline.title, ts, headline.url),
                        None => println!("  - {}\n    {}", headline.title, headline.url),
                    }
                }
            }
            SourceOutcome::Failed { kind, message } => {
                println!("== {} (unavailable: {:?} error: {})", source.name, kind, message);
            }
            SourceOutcome::Skipped { reason } => {
                println!("== {} (skipped: {})", source.name, reason);
            }
        }
    }
}
