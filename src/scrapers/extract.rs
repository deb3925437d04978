//! Selection-rule driven headline extraction.
//!
//! Turns a page body into [`HeadlineRecord`]s using a source's
//! [`SelectionRule`]. The rule's selectors are compiled once per call into a
//! [`CompiledRule`]; every element matching `item` is then mapped to a
//! record or dropped with a [`ValidationError`].
//!
//! Extraction is synchronous and self-contained: `scraper::Html` is not
//! `Send`, so the document never lives across an `.await`.

use crate::config::{SelectionRule, SourceConfig, TimestampRule, Within};
use crate::error::{ParseError, ValidationError};
use crate::models::HeadlineRecord;
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// A [`SelectionRule`] with its selectors parsed.
#[derive(Debug)]
pub struct CompiledRule {
    item_source: String,
    item: Selector,
    anchor: Option<Selector>,
    title: Option<Selector>,
    link_attr: String,
    timestamp: Option<CompiledTimestamp>,
}

#[derive(Debug)]
struct CompiledTimestamp {
    selector: Selector,
    attr: Option<String>,
    within: CompiledWithin,
}

#[derive(Debug)]
enum CompiledWithin {
    Item,
    Parent,
    Ancestor(Selector),
    NextSibling,
}

fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl CompiledRule {
    pub fn compile(rule: &SelectionRule) -> Result<Self, ParseError> {
        Ok(Self {
            item_source: rule.item.clone(),
            item: parse_selector(&rule.item)?,
            anchor: rule.anchor.as_deref().map(parse_selector).transpose()?,
            title: rule.title.as_deref().map(parse_selector).transpose()?,
            link_attr: rule.link_attr.clone(),
            timestamp: rule.timestamp.as_ref().map(CompiledTimestamp::compile).transpose()?,
        })
    }

    /// Map one matched item to a record.
    fn extract_one(
        &self,
        item: ElementRef<'_>,
        base_url: &Url,
        source_key: &str,
    ) -> Result<HeadlineRecord, ValidationError> {
        let anchor = match &self.anchor {
            Some(selector) => item.select(selector).next(),
            None => Some(item),
        };

        let title_element = match &self.title {
            Some(selector) => item.select(selector).next(),
            None => anchor,
        };
        let title = title_element.map(element_text).unwrap_or_default();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let href = anchor
            .and_then(|a| a.value().attr(&self.link_attr))
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ValidationError::MissingHref)?;
        let url = resolve_url(base_url, href)?;

        let timestamp = self.timestamp.as_ref().and_then(|ts| ts.find(item));

        Ok(HeadlineRecord {
            title,
            url,
            timestamp,
            source: source_key.to_string(),
        })
    }
}

impl CompiledTimestamp {
    fn compile(rule: &TimestampRule) -> Result<Self, ParseError> {
        let within = match &rule.within {
            Within::Item => CompiledWithin::Item,
            Within::Parent => CompiledWithin::Parent,
            Within::Ancestor { selector } => CompiledWithin::Ancestor(parse_selector(selector)?),
            Within::NextSibling => CompiledWithin::NextSibling,
        };
        Ok(Self {
            selector: parse_selector(&rule.selector)?,
            attr: rule.attr.clone(),
            within,
        })
    }

    /// Attribute value when configured and present, element text otherwise.
    fn find(&self, item: ElementRef<'_>) -> Option<String> {
        let scope = match &self.within {
            CompiledWithin::Item => Some(item),
            CompiledWithin::Parent => item.parent().and_then(ElementRef::wrap),
            CompiledWithin::Ancestor(selector) => item
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| selector.matches(el)),
            CompiledWithin::NextSibling => item.next_siblings().find_map(ElementRef::wrap),
        }?;
        let element = scope.select(&self.selector).next()?;

        let from_attr = self
            .attr
            .as_deref()
            .and_then(|attr| element.value().attr(attr))
            .map(collapse_whitespace)
            .filter(|v| !v.is_empty());

        from_attr.or_else(|| Some(element_text(element)).filter(|t| !t.is_empty()))
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Resolve `href` against the page URL, accepting only http(s) results.
pub fn resolve_url(base_url: &Url, href: &str) -> Result<String, ValidationError> {
    match base_url.join(href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url.to_string()),
        _ => Err(ValidationError::UnresolvableUrl { href: href.to_string() }),
    }
}

/// Extract every valid headline from `html` according to `source`'s rule.
///
/// Records are deduplicated by URL, first occurrence wins.
///
/// # Errors
///
/// [`ParseError::NoMatches`] when the item selector matches nothing, and
/// [`ParseError::InvalidSelector`] when the rule does not compile.
#[instrument(level = "debug", skip_all, fields(source = %source.key))]
pub fn extract_headlines(html: &str, source: &SourceConfig) -> Result<Vec<HeadlineRecord>, ParseError> {
    let rule = CompiledRule::compile(&source.rule)?;
    let document = Html::parse_document(html);

    let items: Vec<ElementRef<'_>> = document.select(&rule.item).collect();
    if items.is_empty() {
        return Err(ParseError::NoMatches { selector: rule.item_source.clone() });
    }
    let matched = items.len();

    let mut skipped = 0usize;
    let records: Vec<HeadlineRecord> = items
        .into_iter()
        .filter_map(|item| match rule.extract_one(item, &source.base_url, &source.key) {
            Ok(record) => Some(record),
            Err(reason) => {
                skipped += 1;
                debug!(%reason, "Skipping headline element");
                None
            }
        })
        .unique_by(|r| r.url.clone())
        .collect();

    info!(matched, skipped, extracted = records.len(), "Extracted headlines");
    Ok(records)
}
