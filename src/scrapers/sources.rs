//! Built-in news sources.
//!
//! | Key   | Source          | Item selector               | Timestamp                         |
//! |-------|-----------------|-----------------------------|-----------------------------------|
//! | `bbc` | BBC News        | `a.gs-c-promo-heading`      | `time[datetime]` in `.gs-c-promo` |
//! | `hn`  | Hacker News     | `tr.athing`                 | `span.age` text in next row       |
//! | `npr` | NPR News        | `article.item`              | `time[datetime]` in item          |
//! | `toi` | Times of India  | `a[data-vars-event-label]`  | `time, .time` in parent           |
//! | `ht`  | Hindustan Times | `article, .story-card`      | `time, .date` in item             |
//!
//! Sites change their markup; when one does, override its rule in a YAML
//! config rather than editing this table.

use crate::config::{SelectionRule, SourceConfig, TimestampRule, Within};
use url::Url;

fn source(key: &str, name: &str, base_url: &str, rule: SelectionRule) -> SourceConfig {
    SourceConfig {
        key: key.to_string(),
        name: name.to_string(),
        base_url: Url::parse(base_url).expect("built-in source URL is valid"),
        rule,
    }
}

pub fn builtin() -> Vec<SourceConfig> {
    vec![
        source(
            "bbc",
            "BBC News",
            "https://www.bbc.com/news",
            SelectionRule::new("a.gs-c-promo-heading").timestamp(
                TimestampRule::new("time")
                    .attr("datetime")
                    .within(Within::Ancestor { selector: ".gs-c-promo".to_string() }),
            ),
        ),
        source(
            "hn",
            "Hacker News",
            "https://news.ycombinator.com/",
            SelectionRule::new("tr.athing")
                .anchor("span.titleline a")
                .timestamp(TimestampRule::new("span.age").within(Within::NextSibling)),
        ),
        source(
            "npr",
            "NPR News",
            "https://www.npr.org/sections/news/",
            SelectionRule::new("article.item")
                .anchor("h2.title a")
                .timestamp(TimestampRule::new("time").attr("datetime")),
        ),
        source(
            "toi",
            "Times of India",
            "https://timesofindia.indiatimes.com/",
            SelectionRule::new("a[data-vars-event-label]")
                .timestamp(TimestampRule::new("time, .time").attr("datetime").within(Within::Parent)),
        ),
        source(
            "ht",
            "Hindustan Times",
            "https://www.hindustantimes.com/",
            SelectionRule::new("article, .story-card")
                .anchor("h2 a, h3 a, .headline a")
                .timestamp(TimestampRule::new("time, .date").attr("datetime")),
        ),
    ]
}
