//! Scraper configuration: HTTP settings and the list of sources.
//!
//! Configuration is an explicit [`ScraperConfig`] value handed to the
//! extractor; nothing is read from module-level state. It can be built in
//! code, taken from [`ScraperConfig::default`] (which carries the built-in
//! sources), or loaded from a YAML file:
//!
//! ```yaml
//! timeout_secs: 8
//! source_delay_ms: 0
//! sources:
//!   - key: hn
//!     name: Hacker News
//!     base_url: https://news.ycombinator.com/
//!     rule:
//!       item: tr.athing
//!       anchor: span.titleline a
//!       timestamp:
//!         selector: span.age
//!         within: { kind: next_sibling }
//! ```
//!
//! Any field left out takes its default.

use crate::error::{Error, Result};
use crate::scrapers::extract::CompiledRule;
use crate::scrapers::sources;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Sent with every request; many sites reject default client signatures.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Settings for one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// User-Agent header for page and robots.txt requests.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    pub retries: usize,
    /// Base delay before the first retry, doubled on each further attempt.
    pub retry_delay_ms: u64,
    /// Upper bound of random jitter added to every retry delay.
    pub retry_jitter_ms: u64,
    /// Pause between consecutive source requests.
    pub source_delay_ms: u64,
    /// Sources not started within this many seconds are skipped.
    pub budget_secs: Option<u64>,
    /// How many sources may be fetched at once.
    pub concurrency: usize,
    /// Check robots.txt before fetching a source page.
    pub respect_robots: bool,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
    /// Sources in run order; the built-in list when omitted.
    pub sources: Vec<SourceConfig>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            retries: 1,
            retry_delay_ms: 500,
            retry_jitter_ms: 250,
            source_delay_ms: 1000,
            budget_secs: Some(10),
            concurrency: 1,
            respect_robots: true,
            proxy: None,
            sources: sources::builtin(),
        }
    }
}

impl ScraperConfig {
    /// Load a YAML configuration file and validate it.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&content)?;
        info!(sources = config.sources.len(), "Loaded scraper configuration");
        Ok(config)
    }

    /// Parse and validate YAML text; omitted fields take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ScraperConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the extractor could not run.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than zero".into()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.key.trim().is_empty() {
                return Err(Error::Config(format!("source `{}` has an empty key", source.name)));
            }
            if !seen.insert(source.key.as_str()) {
                return Err(Error::Config(format!("duplicate source key `{}`", source.key)));
            }
            if !matches!(source.base_url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "source `{}` base_url must be http(s), got `{}`",
                    source.key, source.base_url
                )));
            }
            CompiledRule::compile(&source.rule)?;
        }
        Ok(())
    }

    /// Look up a configured source by key.
    pub fn source(&self, key: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.key == key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn retry_jitter(&self) -> Duration {
        Duration::from_millis(self.retry_jitter_ms)
    }

    pub fn source_delay(&self) -> Duration {
        Duration::from_millis(self.source_delay_ms)
    }

    /// `None` means no time limit.
    pub fn budget(&self) -> Option<Duration> {
        self.budget_secs.map(Duration::from_secs)
    }
}

/// One website to scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short identifier, stamped on every record (`bbc`, `hn`, ...).
    pub key: String,
    /// Display name.
    pub name: String,
    /// Page to fetch; relative links are resolved against it.
    pub base_url: Url,
    pub rule: SelectionRule,
}

/// Which elements of a page are headlines, and where their fields live.
///
/// All selectors are CSS selectors. `anchor`, `title`, and the timestamp
/// selector are evaluated inside each matched `item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRule {
    /// One match per headline.
    pub item: String,
    /// Element carrying the link; the item itself when absent.
    #[serde(default)]
    pub anchor: Option<String>,
    /// Element carrying the title text; the anchor when absent.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_link_attr")]
    pub link_attr: String,
    #[serde(default)]
    pub timestamp: Option<TimestampRule>,
}

fn default_link_attr() -> String {
    "href".to_string()
}

impl SelectionRule {
    /// A rule matching `item`, linking through the item's own `href`.
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            anchor: None,
            title: None,
            link_attr: default_link_attr(),
            timestamp: None,
        }
    }

    pub fn anchor(mut self, selector: impl Into<String>) -> Self {
        self.anchor = Some(selector.into());
        self
    }

    pub fn title(mut self, selector: impl Into<String>) -> Self {
        self.title = Some(selector.into());
        self
    }

    pub fn timestamp(mut self, rule: TimestampRule) -> Self {
        self.timestamp = Some(rule);
        self
    }
}

/// Where to find a headline's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampRule {
    pub selector: String,
    /// Attribute to read (e.g. `datetime`); element text otherwise.
    #[serde(default)]
    pub attr: Option<String>,
    #[serde(default)]
    pub within: Within,
}

impl TimestampRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self { selector: selector.into(), attr: None, within: Within::Item }
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    pub fn within(mut self, within: Within) -> Self {
        self.within = within;
        self
    }
}

/// Element the timestamp selector is evaluated in, relative to the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Within {
    #[default]
    Item,
    Parent,
    /// Closest ancestor matching `selector`.
    Ancestor { selector: String },
    /// First element sibling after the item (table-row layouts).
    NextSibling,
}
