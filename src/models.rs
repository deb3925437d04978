//! Data models for scraped headlines and per-source results.
//!
//! This module defines the structures that flow out of the extractor:
//! - [`HeadlineRecord`]: one normalized headline
//! - [`SourceOutcome`]: what happened to one source during a run
//! - [`SourceReport`]: an outcome tagged with the source it belongs to
//! - [`HeadlineReport`]: the full result of one "get headlines" call
//!
//! Records are created fresh on every run and are never persisted; the
//! serialized forms here are what the presentation layer and the export
//! writers consume.

use crate::error::{FetchError, ParseError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A single normalized headline.
///
/// `title` is never empty and `url` is always an absolute http(s) URL;
/// elements that cannot satisfy both are dropped during extraction.
///
/// Field order matters: it defines the CSV column order
/// (`title,url,timestamp,source`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineRecord {
    /// Headline text, whitespace-collapsed and trimmed.
    pub title: String,
    /// Absolute link to the story.
    pub url: String,
    /// Source-provided timestamp text, left unparsed. Never `Some("")`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub timestamp: Option<String>,
    /// Key of the configured source that produced this record.
    pub source: String,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl HeadlineRecord {
    /// Case-insensitive substring match against the title.
    ///
    /// `keyword` must already be lowercase.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        self.title.to_lowercase().contains(keyword)
    }
}

/// Keep only records whose title contains `keyword`, ignoring case.
///
/// A missing or blank keyword keeps everything. Applying the same filter
/// twice yields the same list.
pub fn filter_by_keyword(records: Vec<HeadlineRecord>, keyword: Option<&str>) -> Vec<HeadlineRecord> {
    match keyword.map(str::trim).filter(|k| !k.is_empty()) {
        None => records,
        Some(keyword) => {
            let keyword = keyword.to_lowercase();
            records.into_iter().filter(|r| r.matches_keyword(&keyword)).collect()
        }
    }
}

/// Which stage of the pipeline a source failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Parse,
}

/// The result of running one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Ok { headlines: Vec<HeadlineRecord> },
    Failed { kind: FailureKind, message: String },
    Skipped { reason: String },
}

impl SourceOutcome {
    /// `true` when the source produced a headline list (possibly empty).
    pub fn is_ok(&self) -> bool {
        matches!(self, SourceOutcome::Ok { .. })
    }

    /// The headlines of a successful source; empty otherwise.
    pub fn headlines(&self) -> &[HeadlineRecord] {
        match self {
            SourceOutcome::Ok { headlines } => headlines,
            _ => &[],
        }
    }
}

impl From<FetchError> for SourceOutcome {
    fn from(e: FetchError) -> Self {
        SourceOutcome::Failed { kind: FailureKind::Fetch, message: e.to_string() }
    }
}

impl From<ParseError> for SourceOutcome {
    fn from(e: ParseError) -> Self {
        SourceOutcome::Failed { kind: FailureKind::Parse, message: e.to_string() }
    }
}

/// One source's outcome, labelled for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Configured source key, or the unknown key that was requested.
    pub key: String,
    /// Display name.
    pub name: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

/// Everything one extraction run produced, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineReport {
    pub sources: Vec<SourceReport>,
}

impl HeadlineReport {
    /// Source key → outcome.
    pub fn by_source(&self) -> BTreeMap<&str, &SourceOutcome> {
        self.sources.iter().map(|r| (r.key.as_str(), &r.outcome)).collect()
    }

    /// All successful records, flattened in source order.
    pub fn records(&self) -> Vec<HeadlineRecord> {
        self.sources
            .iter()
            .flat_map(|r| r.outcome.headlines().iter().cloned())
            .collect()
    }

    /// Sources that failed to fetch or parse.
    pub fn failed(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Failed { .. }))
    }
}
