//! Command-line interface definitions for Headline Scraper.
//!
//! Network settings can also come from environment variables; flags win.

use clap::Parser;
use headline_scraper::{ExportFormat, ScraperConfig};
use std::path::PathBuf;

/// Command-line arguments for the Headline Scraper application.
///
/// # Examples
///
/// ```sh
/// # All built-in sources, printed to the terminal
/// headline_scraper
///
/// # Two sources, filtered, exported as CSV
/// headline_scraper -s bbc -s npr -k climate -f csv -o ./data
///
/// # Custom source list
/// headline_scraper --config sources.yaml --report
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "HEADLINES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only scrape these source keys (repeatable)
    #[arg(short, long = "source")]
    pub sources: Vec<String>,

    /// Keep only headlines whose title contains this text (case-insensitive)
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Export format used with --output-dir
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Directory to write a timestamped export file into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "HEADLINES_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Proxy URL for all requests
    #[arg(long, env = "HEADLINES_PROXY")]
    pub proxy: Option<String>,

    /// Number of sources fetched at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Skip the robots.txt check
    #[arg(long)]
    pub no_robots: bool,

    /// Print the full per-source report as JSON
    #[arg(long)]
    pub report: bool,

    /// List configured sources and exit
    #[arg(long)]
    pub list_sources: bool,
}

impl Cli {
    /// Keyword with surrounding whitespace removed; blank means none.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ScraperConfig) {
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.no_robots {
            config.respect_robots = false;
        }
    }
}
