//! Headline extraction across the configured sources.
//!
//! Every source goes through the same single pass:
//!
//! 1. **Robots**: consult `/robots.txt` (when enabled)
//! 2. **Fetch**: GET the source's `base_url`; non-2xx fails the source
//! 3. **Extract**: apply the source's selection rule ([`extract`])
//! 4. **Filter**: keep titles containing the keyword, ignoring case
//!
//! # Failure isolation
//!
//! A source that fails is reported as [`SourceOutcome::Failed`] next to the
//! sources that succeeded; [`HeadlineExtractor::get_headlines`] itself never
//! fails.
//!
//! # Pacing
//!
//! Sources run in configuration order, at most `concurrency` at a time.
//! Sequential runs pause `source_delay_ms` between sources. Sources that
//! would start after `budget_secs` are skipped straight away, without
//! waiting out their delay.

pub mod extract;
pub mod sources;

use crate::config::{ScraperConfig, SourceConfig};
use crate::error::{Error, FetchError, Result};
use crate::fetch::{HttpFetcher, PageFetcher, RetryFetch};
use crate::models::{
    filter_by_keyword, FailureKind, HeadlineRecord, HeadlineReport, SourceOutcome, SourceReport,
};
use crate::robots;
use crate::utils::truncate_for_log;
use extract::extract_headlines;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info, instrument, warn};

enum Selected<'a> {
    Known(&'a SourceConfig),
    Unknown(String),
}

/// Fetches and normalizes headlines for a [`ScraperConfig`].
#[derive(Debug)]
pub struct HeadlineExtractor<F = RetryFetch<HttpFetcher>> {
    config: ScraperConfig,
    fetcher: F,
}

impl HeadlineExtractor {
    /// Validate `config` and build the HTTP client from it.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = RetryFetch::new(HttpFetcher::new(&config)?, config.retries, config.retry_delay())
            .with_jitter(config.retry_jitter());
        Ok(Self { config, fetcher })
    }
}

impl<F: PageFetcher> HeadlineExtractor<F> {
    /// Build an extractor around a custom [`PageFetcher`].
    ///
    /// `config` is used as is; call [`ScraperConfig::validate`] first when it
    /// comes from outside.
    pub fn with_fetcher(config: ScraperConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// The configuration this extractor runs with.
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Run one source: robots check, fetch, extract, filter.
    #[instrument(level = "info", skip_all, fields(source = %source.key))]
    pub async fn extract_source(
        &self,
        source: &SourceConfig,
        keyword: Option<&str>,
    ) -> Result<Vec<HeadlineRecord>> {
        if self.config.respect_robots {
            robots::check(&self.fetcher, &source.base_url, &self.config.user_agent).await?;
        }

        let page = self.fetcher.get(&source.base_url).await?;
        if !page.is_success() {
            return Err(FetchError::Status {
                url: source.base_url.to_string(),
                status: page.status,
            }
            .into());
        }

        let records = extract_headlines(&page.body, source).inspect_err(|e| {
            warn!(error = %e, body_preview = %truncate_for_log(&page.body, 300), "Page did not match selection rule");
        })?;
        Ok(filter_by_keyword(records, keyword))
    }

    /// Headlines from every configured source.
    ///
    /// # Arguments
    ///
    /// * `keyword` - Case-insensitive title filter; `None` or blank keeps all
    ///
    /// # Returns
    ///
    /// One [`SourceReport`] per configured source, in configuration order.
    /// Failed sources are reported, never propagated.
    pub async fn get_headlines(&self, keyword: Option<&str>) -> HeadlineReport {
        let selection = self.config.sources.iter().map(Selected::Known).collect();
        self.run(selection, keyword).await
    }

    /// Headlines from the named sources only, in the order given.
    ///
    /// Unknown keys are reported as skipped; repeated keys run once.
    pub async fn get_headlines_from(&self, keys: &[String], keyword: Option<&str>) -> HeadlineReport {
        let selection = keys
            .iter()
            .unique()
            .map(|key| match self.config.source(key) {
                Some(source) => Selected::Known(source),
                None => Selected::Unknown(key.clone()),
            })
            .collect();
        self.run(selection, keyword).await
    }

    #[instrument(level = "info", skip_all, fields(keyword = ?keyword))]
    async fn run(&self, selection: Vec<Selected<'_>>, keyword: Option<&str>) -> HeadlineReport {
        let started = Instant::now();
        let total = selection.len();

        // Built eagerly so the stream holds plain futures, not a borrowing closure.
        let pending: Vec<_> = selection
            .into_iter()
            .enumerate()
            .map(|(index, selected)| self.run_one(index, selected, keyword, started))
            .collect();
        let sources: Vec<SourceReport> = stream::iter(pending)
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let report = HeadlineReport { sources };
        info!(
            sources = total,
            failed = report.failed().count(),
            headlines = report.records().len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Headline run complete"
        );
        report
    }

    async fn run_one(
        &self,
        index: usize,
        selected: Selected<'_>,
        keyword: Option<&str>,
        started: Instant,
    ) -> SourceReport {
        let source = match selected {
            Selected::Known(source) => source,
            Selected::Unknown(key) => {
                warn!(source = %key, "Unknown source");
                return SourceReport {
                    name: key.clone(),
                    key,
                    outcome: SourceOutcome::Skipped { reason: "unknown source".to_string() },
                };
            }
        };

        let delay = if index > 0 && self.config.concurrency <= 1 {
            self.config.source_delay()
        } else {
            Duration::ZERO
        };

        if let Some(budget) = self.config.budget() {
            if started.elapsed() + delay > budget {
                warn!(source = %source.key, budget_secs = budget.as_secs(), "Time budget exhausted; skipping");
                return SourceReport {
                    key: source.key.clone(),
                    name: source.name.clone(),
                    outcome: SourceOutcome::Skipped {
                        reason: format!("stopped after {}s time budget", budget.as_secs()),
                    },
                };
            }
        }

        if !delay.is_zero() {
            sleep(delay).await;
        }

        let t0 = Instant::now();
        let outcome = match self.extract_source(source, keyword).await {
            Ok(headlines) => {
                info!(source = %source.key, count = headlines.len(), elapsed_ms = t0.elapsed().as_millis(), "Fetched headlines");
                SourceOutcome::Ok { headlines }
            }
            Err(Error::Fetch(e)) => {
                error!(source = %source.key, error = %e, "Source fetch failed");
                e.into()
            }
            Err(Error::Parse(e)) => {
                error!(source = %source.key, error = %e, "Source parse failed");
                e.into()
            }
            Err(e) => {
                error!(source = %source.key, error = %e, "Source failed");
                SourceOutcome::Failed {
                    kind: FailureKind::Fetch,
                    message: e.to_string(),
                }
            }
        };

        SourceReport {
            key: source.key.clone(),
            name: source.name.clone(),
            outcome,
        }
    }
}
