//! Test doubles shared across module tests.

use crate::error::FetchError;
use crate::fetch::{Page, PageFetcher};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use url::Url;

/// A scripted response.
#[derive(Debug, Clone)]
pub(crate) enum Canned {
    Page(Page),
    Timeout,
}

impl Canned {
    pub(crate) fn page(status: u16, body: &str) -> Self {
        Canned::Page(Page { status, body: body.to_string() })
    }
}

/// In-memory [`PageFetcher`] answering from per-URL scripts.
///
/// Each URL's responses are played in order; the last one repeats. URLs
/// with no script answer `404`.
#[derive(Debug, Default)]
pub(crate) struct FakeFetcher {
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(self, url: &str, response: Canned) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == url).count()
    }
}

impl PageFetcher for FakeFetcher {
    async fn get(&self, url: &Url) -> Result<Page, FetchError> {
        let key = url.to_string();
        self.calls.lock().unwrap().push(key.clone());

        let next = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match next {
            Some(Canned::Page(page)) => Ok(page),
            Some(Canned::Timeout) => Err(FetchError::Timeout { url: key }),
            None => Ok(Page { status: 404, body: String::new() }),
        }
    }
}
