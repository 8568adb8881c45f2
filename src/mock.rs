//! テスト用の `BrowserDriver` 実装

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::traits::BrowserDriver;
use crate::types::FeedMetrics;

/// 再計測のたびに `growth` ずつ伸び、`growths` 回で止まるフィード
#[derive(Debug, Clone)]
pub(crate) struct MockFeed {
    height: f64,
    growth: f64,
    growths: usize,
}

impl MockFeed {
    pub(crate) fn growing(height: f64, growth: f64, growths: usize) -> Self {
        Self {
            height,
            growth,
            growths,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MockPage {
    url: Mutex<Option<String>>,
}

#[derive(Debug, Clone)]
enum MockResponse {
    Html(String),
    NavigationError,
    ContentError,
}

#[derive(Default)]
pub(crate) struct MockDriver {
    feed: Mutex<Option<MockFeed>>,
    pages: HashMap<String, MockResponse>,
    delays: HashMap<String, Duration>,
    search_html: Option<String>,
    fail_open_after: Option<usize>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    scrolls: AtomicUsize,
    measures: AtomicUsize,
    visits: Mutex<Vec<String>>,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_feed(mut self, feed: MockFeed) -> Self {
        self.feed = Mutex::new(Some(feed));
        self
    }

    /// `/maps/search/` へのナビゲーションに返すHTML
    pub(crate) fn with_search_html(mut self, html: impl Into<String>) -> Self {
        self.search_html = Some(html.into());
        self
    }

    pub(crate) fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages
            .insert(url.to_string(), MockResponse::Html(html.into()));
        self
    }

    pub(crate) fn with_navigation_error(mut self, url: &str) -> Self {
        self.pages
            .insert(url.to_string(), MockResponse::NavigationError);
        self
    }

    pub(crate) fn with_content_error(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), MockResponse::ContentError);
        self
    }

    /// ナビゲーションに時間がかかるページ
    pub(crate) fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// `n` 個開いた後は `open_context` が失敗する
    pub(crate) fn with_open_limit(mut self, n: usize) -> Self {
        self.fail_open_after = Some(n);
        self
    }

    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn feed_scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub(crate) fn feed_measures(&self) -> usize {
        self.measures.load(Ordering::SeqCst)
    }

    pub(crate) fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }

    fn response(&self, url: &str) -> Option<MockResponse> {
        if let Some(response) = self.pages.get(url) {
            return Some(response.clone());
        }
        if url.contains("/maps/search/") {
            return self.search_html.clone().map(MockResponse::Html);
        }
        None
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    type Context = MockPage;

    async fn open_context(&self) -> Result<MockPage, ExtractionError> {
        if let Some(limit) = self.fail_open_after {
            if self.opened() >= limit {
                return Err(ExtractionError::BrowserInit("page limit".into()));
            }
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockPage {
            url: Mutex::new(None),
        })
    }

    async fn navigate(&self, page: &MockPage, url: &str) -> Result<(), ExtractionError> {
        self.visits.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        match self.response(url) {
            Some(MockResponse::NavigationError) | None => {
                Err(ExtractionError::Navigation(format!("net::ERR_FAILED {}", url)))
            }
            Some(_) => {
                *page.url.lock().unwrap() = Some(url.to_string());
                Ok(())
            }
        }
    }

    async fn content(&self, page: &MockPage) -> Result<String, ExtractionError> {
        let url = page.url.lock().unwrap().clone().unwrap_or_default();
        match self.response(&url) {
            Some(MockResponse::Html(html)) => Ok(html),
            _ => Err(ExtractionError::JavaScript(format!("no content for {}", url))),
        }
    }

    async fn close_context(&self, _page: MockPage) -> Result<(), ExtractionError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn scroll_feed(
        &self,
        _page: &MockPage,
        _selector: &str,
        _distance: u32,
    ) -> Result<Option<FeedMetrics>, ExtractionError> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        let feed = self.feed.lock().unwrap();
        Ok(feed.as_ref().map(|feed| FeedMetrics {
            scroll_height: feed.height,
        }))
    }

    async fn measure_feed(
        &self,
        _page: &MockPage,
        _selector: &str,
    ) -> Result<Option<FeedMetrics>, ExtractionError> {
        self.measures.fetch_add(1, Ordering::SeqCst);
        let mut feed = self.feed.lock().unwrap();
        Ok(feed.as_mut().map(|feed| {
            if feed.growths > 0 {
                feed.height += feed.growth;
                feed.growths -= 1;
            }
            FeedMetrics {
                scroll_height: feed.height,
            }
        }))
    }
}
