//! HTTP page fetching with retry and backoff.
//!
//! # Architecture
//!
//! - [`PageFetcher`]: core trait, "GET this URL and give me status + body"
//! - [`HttpFetcher`]: `reqwest` implementation with timeout, User-Agent, proxy
//! - [`RetryFetch`]: decorator adding retries to any `PageFetcher`
//!
//! Non-success statuses are *not* errors at this layer: a [`Page`] carries
//! whatever status the server sent, and callers decide what it means
//! (robots.txt treats a 404 very differently from a headline page).
//!
//! # Retry Strategy
//!
//! Timeouts, connection failures, and HTTP 429/500/502/503/504 are retried.
//! The delay doubles from `base_delay`, is capped at `max_delay`, and gets
//! random jitter added.

use crate::config::ScraperConfig;
use crate::error::{is_retryable_status, FetchError, Result};
use rand::{rng, Rng};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// A fetched response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// HTTP status code as sent by the server.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl Page {
    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for async page retrieval.
///
/// Implementors return `Err` only when no response arrived at all. The
/// returned future is `Send` so extraction runs can be spawned onto a
/// multi-threaded runtime.
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return its status and body.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to request
    ///
    /// # Returns
    ///
    /// The [`Page`] for any response, including error statuses, or a
    /// [`FetchError`] on timeout or connection failure.
    fn get(&self, url: &Url) -> impl Future<Output = std::result::Result<Page, FetchError>> + Send;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client from the configured User-Agent, timeout, and proxy.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .connect_timeout(config.timeout());
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        Ok(Self { client: builder.build()? })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout { url: url.to_string() }
    } else {
        FetchError::Network { url: url.to_string(), source: e }
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &Url) -> std::result::Result<Page, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;
        debug!(status, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis(), "Fetched page");
        Ok(Page { status, body })
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`PageFetcher`].
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=jitter)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
    jitter: Duration,
}

impl<T> RetryFetch<T>
where
    T: PageFetcher,
{
    /// Create a new retry wrapper around an existing [`PageFetcher`].
    ///
    /// # Arguments
    ///
    /// * `inner` - The fetcher to wrap
    /// * `max_retries` - Extra attempts after the first transient failure
    /// * `base_delay` - Delay before the first retry
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(10),
            jitter: Duration::from_millis(250),
        }
    }

    /// Replace the default 250ms jitter ceiling.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter_ms: u64 = if jitter_ms == 0 { 0 } else { rng().random_range(0..=jitter_ms) };
        delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("jitter", &self.jitter)
            .finish()
    }
}

impl<T> PageFetcher for RetryFetch<T>
where
    T: PageFetcher,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &Url) -> std::result::Result<Page, FetchError> {
        let mut attempt = 0usize;

        loop {
            let result = self.inner.get(url).await;
            let failure = match &result {
                Ok(page) if is_retryable_status(page.status) => format!("HTTP {}", page.status),
                Err(e) if e.is_transient() => e.to_string(),
                _ => return result,
            };

            attempt += 1;
            if attempt > self.max_retries {
                if self.max_retries > 0 {
                    error!(attempt, max = self.max_retries, error = %failure, "get() exhausted retries");
                }
                return result;
            }

            let delay = self.backoff(attempt);
            warn!(attempt, max = self.max_retries, ?delay, error = %failure, "get() attempt failed; backing off");
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Canned, FakeFetcher};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    /// Serve `response` verbatim to the first connection.
    async fn serve_once(response: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        url(&format!("http://{addr}/news"))
    }

    fn test_client(timeout: Duration) -> HttpFetcher {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        HttpFetcher::from_client(client)
    }

    #[tokio::test]
    async fn test_http_fetcher_reads_body() {
        let target = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 26\r\nConnection: close\r\n\r\n<a href=\"/x\">Headline</a>\n",
        )
        .await;
        let page = test_client(Duration::from_secs(5)).get(&target).await.unwrap();
        assert!(page.is_success());
        assert!(page.body.contains("Headline"));
    }

    #[tokio::test]
    async fn test_http_fetcher_passes_error_status_through() {
        let target = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let page = test_client(Duration::from_secs(5)).get(&target).await.unwrap();
        assert_eq!(page.status, 503);
        assert!(!page.is_success());
    }

    #[tokio::test]
    async fn test_http_fetcher_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            sleep(Duration::from_secs(5)).await;
        });

        let target = url(&format!("http://{addr}/slow"));
        let err = test_client(Duration::from_millis(200)).get(&target).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_http_fetcher_from_config() {
        let config = ScraperConfig {
            proxy: Some("http://127.0.0.1:3128".to_string()),
            ..ScraperConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_retry_recovers_from_timeout() {
        let target = "https://flaky.example.com/";
        let fake = FakeFetcher::new()
            .route(target, Canned::Timeout)
            .route(target, Canned::page(200, "ok"));
        let retrying = RetryFetch::new(fake, 1, Duration::ZERO).with_jitter(Duration::ZERO);

        let page = retrying.get(&url(target)).await.unwrap();
        assert_eq!(page.body, "ok");
        assert_eq!(retrying.inner.call_count(target), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_503() {
        let target = "https://busy.example.com/";
        let fake = FakeFetcher::new()
            .route(target, Canned::page(503, ""))
            .route(target, Canned::page(200, "fine"));
        let retrying = RetryFetch::new(fake, 2, Duration::ZERO).with_jitter(Duration::ZERO);

        let page = retrying.get(&url(target)).await.unwrap();
        assert_eq!(page.status, 200);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let target = "https://down.example.com/";
        let fake = FakeFetcher::new().route(target, Canned::Timeout);
        let retrying = RetryFetch::new(fake, 1, Duration::ZERO).with_jitter(Duration::ZERO);

        let err = retrying.get(&url(target)).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_no_retry_on_404() {
        let target = "https://gone.example.com/";
        let fake = FakeFetcher::new().route(target, Canned::page(404, ""));
        let retrying = RetryFetch::new(fake, 3, Duration::ZERO).with_jitter(Duration::ZERO);

        let page = retrying.get(&url(target)).await.unwrap();
        assert_eq!(page.status, 404);
        assert_eq!(retrying.inner.call_count(target), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let retrying = RetryFetch::new(FakeFetcher::new(), 5, Duration::from_secs(1)).with_jitter(Duration::ZERO);
        assert_eq!(retrying.backoff(1), Duration::from_secs(1));
        assert_eq!(retrying.backoff(2), Duration::from_secs(2));
        assert_eq!(retrying.backoff(3), Duration::from_secs(4));
        assert_eq!(retrying.backoff(10), Duration::from_secs(10));
    }
}
