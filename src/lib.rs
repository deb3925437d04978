//! # Headline Scraper
//!
//! Fetches news headlines from a small set of web sources, normalizes them
//! into [`HeadlineRecord`]s, optionally filters them by keyword, and exports
//! them to JSON or CSV.
//!
//! ## Usage
//!
//! ```no_run
//! use headline_scraper::{HeadlineExtractor, ScraperConfig};
//!
//! # async fn run() -> headline_scraper::Result<()> {
//! let extractor = HeadlineExtractor::new(ScraperConfig::default())?;
//! let report = extractor.get_headlines(Some("climate")).await;
//! for source in &report.sources {
//!     println!("{}: {:?}", source.name, source.outcome.headlines().len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Each source is a configuration record (base URL + selection rule) and
//! goes through one pass: robots check, fetch, extract, filter. Sources
//! fail independently; a run always returns a [`HeadlineReport`].

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod robots;
pub mod scrapers;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{ScraperConfig, SelectionRule, SourceConfig, TimestampRule, Within};
pub use error::{Error, FetchError, ParseError, Result, ValidationError};
pub use fetch::{HttpFetcher, Page, PageFetcher, RetryFetch};
pub use models::{FailureKind, HeadlineRecord, HeadlineReport, SourceOutcome, SourceReport};
pub use outputs::ExportFormat;
pub use scrapers::HeadlineExtractor;
