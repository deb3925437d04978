//! robots.txt handling.
//!
//! Before a source page is fetched its host's `/robots.txt` is consulted.
//! The group matching our User-Agent product token (e.g. `mozilla`) is used,
//! falling back to the `*` group. Rules are plain path prefixes; the longest
//! matching rule wins and `Allow` wins a tie.
//!
//! | robots.txt response      | Result                  |
//! |--------------------------|-------------------------|
//! | 2xx                      | rules applied           |
//! | 401 / 403                | everything disallowed   |
//! | other 4xx                | everything allowed      |
//! | 5xx or no response       | source fails            |

use crate::error::FetchError;
use crate::fetch::PageFetcher;
use tracing::{debug, instrument, warn};
use url::Url;

/// Rules of the robots.txt group that applies to our User-Agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    /// `(allow, path_prefix)` pairs of the selected group.
    rules: Vec<(bool, String)>,
}

#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<(bool, String)>,
}

impl RobotsRules {
    /// No rules: every path is allowed.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// A single `Disallow: /`.
    pub fn disallow_all() -> Self {
        Self { rules: vec![(false, "/".to_string())] }
    }

    /// Parse a robots.txt body and keep the group for `user_agent`.
    ///
    /// # Arguments
    ///
    /// * `body` - robots.txt content
    /// * `user_agent` - Full User-Agent header; only its product token is matched
    ///
    /// # Returns
    ///
    /// The matching group's rules, the `*` group's when none matches, or
    /// [`RobotsRules::allow_all`] when neither exists.
    pub fn parse(body: &str, user_agent: &str) -> Self {
        let token = user_agent
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let mut groups: Vec<Group> = Vec::new();
        let mut current: Option<Group> = None;
        let mut last_was_agent = false;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match field.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if !last_was_agent {
                        groups.extend(current.take());
                        current = Some(Group::default());
                    }
                    if let Some(group) = current.as_mut() {
                        group.agents.push(value.to_lowercase());
                    }
                    last_was_agent = true;
                }
                kind @ ("allow" | "disallow") => {
                    if let Some(group) = current.as_mut() {
                        // An empty Disallow means "nothing is disallowed".
                        if !value.is_empty() {
                            group.rules.push((kind == "allow", value.to_string()));
                        }
                    }
                    last_was_agent = false;
                }
                _ => last_was_agent = false,
            }
        }
        groups.extend(current);

        let specific = groups.iter().position(|g| {
            g.agents.iter().any(|a| a != "*" && !token.is_empty() && token.contains(a.as_str()))
        });
        let wildcard = || groups.iter().position(|g| g.agents.iter().any(|a| a == "*"));

        match specific.or_else(wildcard) {
            Some(i) => Self { rules: std::mem::take(&mut groups[i].rules) },
            None => Self::allow_all(),
        }
    }

    /// Whether `path` may be fetched.
    ///
    /// `path` should include the query string, if any.
    pub fn is_allowed(&self, path: &str) -> bool {
        self.rules
            .iter()
            .filter(|(_, prefix)| path.starts_with(prefix.as_str()))
            .max_by_key(|(allow, prefix)| (prefix.len(), *allow))
            .map(|(allow, _)| *allow)
            .unwrap_or(true)
    }
}

fn path_of(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

/// Fail with [`FetchError`] unless robots.txt permits fetching `target`.
#[instrument(level = "debug", skip_all, fields(%target))]
pub async fn check<F: PageFetcher>(fetcher: &F, target: &Url, user_agent: &str) -> Result<(), FetchError> {
    let robots_url = target.join("/robots.txt").map_err(|e| FetchError::RobotsUnavailable {
        url: target.to_string(),
        reason: e.to_string(),
    })?;

    let rules = match fetcher.get(&robots_url).await {
        Ok(page) if page.is_success() => RobotsRules::parse(&page.body, user_agent),
        Ok(page) if matches!(page.status, 401 | 403) => RobotsRules::disallow_all(),
        Ok(page) if (400..500).contains(&page.status) => RobotsRules::allow_all(),
        Ok(page) => {
            warn!(status = page.status, "robots.txt unavailable");
            return Err(FetchError::RobotsUnavailable {
                url: robots_url.to_string(),
                reason: format!("HTTP {}", page.status),
            });
        }
        Err(e) => {
            warn!(error = %e, "robots.txt unavailable");
            return Err(FetchError::RobotsUnavailable {
                url: robots_url.to_string(),
                reason: e.to_string(),
            });
        }
    };

    if rules.is_allowed(&path_of(target)) {
        debug!("robots.txt allows fetch");
        Ok(())
    } else {
        Err(FetchError::RobotsDisallowed { url: target.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Canned, FakeFetcher};

    const UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Chrome/126.0";

    #[test]
    fn test_wildcard_group() {
        let body = "User-agent: *\nDisallow: /private\nAllow: /private/open\n";
        let rules = RobotsRules::parse(body, UA);
        assert!(rules.is_allowed("/news"));
        assert!(!rules.is_allowed("/private/x"));
        assert!(rules.is_allowed("/private/open/story"));
    }

    #[test]
    fn test_specific_group_wins_over_wildcard() {
        let body = "\
User-agent: *
Disallow: /

User-agent: Mozilla
Disallow: /admin
";
        let rules = RobotsRules::parse(body, UA);
        assert!(rules.is_allowed("/news"));
        assert!(!rules.is_allowed("/admin/panel"));
    }

    #[test]
    fn test_grouped_agents_and_comments() {
        let body = "\
# comment line
User-agent: SomeBot
User-agent: *   # everyone else
Disallow: /search
Disallow:
";
        let rules = RobotsRules::parse(body, UA);
        assert!(!rules.is_allowed("/search?q=x"));
        assert!(rules.is_allowed("/"));
    }

    #[test]
    fn test_no_matching_group_allows() {
        let rules = RobotsRules::parse("User-agent: OtherBot\nDisallow: /\n", UA);
        assert!(rules.is_allowed("/anything"));
    }

    #[test]
    fn test_tie_goes_to_allow() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow: /news\nAllow: /news\n", UA);
        assert!(rules.is_allowed("/news/today"));
    }

    #[tokio::test]
    async fn test_check_disallowed() {
        let fake = FakeFetcher::new().route(
            "https://site.example.com/robots.txt",
            Canned::page(200, "User-agent: *\nDisallow: /news\n"),
        );
        let target = Url::parse("https://site.example.com/news/").unwrap();
        let err = check(&fake, &target, UA).await.unwrap_err();
        assert!(matches!(err, FetchError::RobotsDisallowed { .. }));
    }

    #[tokio::test]
    async fn test_check_missing_robots_allows() {
        let fake = FakeFetcher::new();
        let target = Url::parse("https://site.example.com/news/").unwrap();
        assert!(check(&fake, &target, UA).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_forbidden_robots_blocks() {
        let fake = FakeFetcher::new().route("https://site.example.com/robots.txt", Canned::page(403, ""));
        let target = Url::parse("https://site.example.com/").unwrap();
        assert!(matches!(
            check(&fake, &target, UA).await,
            Err(FetchError::RobotsDisallowed { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_unreachable_robots_blocks() {
        let fake = FakeFetcher::new().route("https://site.example.com/robots.txt", Canned::Timeout);
        let target = Url::parse("https://site.example.com/").unwrap();
        assert!(matches!(
            check(&fake, &target, UA).await,
            Err(FetchError::RobotsUnavailable { .. })
        ));
    }
}
