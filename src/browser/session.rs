use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::traits::BrowserDriver;
use crate::types::FeedMetrics;

use super::scripts;

/// 1クエリ分のブラウザプロセス
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
    debug: bool,
}

impl ChromeSession {
    /// ブラウザを起動
    pub async fn launch(config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        info!("Launching browser (headless={})...", config.headless);

        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("maps-extractor-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(1280, 800);

        if let Some(chrome_path) = &config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .request_timeout(config.timeout)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--lang=en-US");

        if config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder.build().map_err(ExtractionError::BrowserInit)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ExtractionError::BrowserInit(e.to_string()))?;

        // ハンドラータスクを起動
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        info!("Browser launched");
        Ok(Self {
            browser,
            handler,
            user_data_dir,
            debug: config.debug,
        })
    }

    /// 猶予時間の後にブラウザを終了
    ///
    /// 終了処理の失敗は結果に影響させない。
    pub async fn shutdown(mut self, grace: Duration) {
        if !grace.is_zero() {
            debug!("Waiting {:?} before closing browser", grace);
            sleep(grace).await;
        }

        info!("Closing browser...");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
            debug!("Failed to remove user data dir {:?}: {}", self.user_data_dir, e);
        }
        info!("Browser closed");
    }

    async fn evaluate_metrics(
        &self,
        page: &Page,
        script: String,
    ) -> Result<Option<FeedMetrics>, ExtractionError> {
        let json_str = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ExtractionError::JavaScript(e.to_string()))?
            .into_value::<String>()
            .map_err(|e| ExtractionError::JavaScript(e.to_string()))?;

        serde_json::from_str(&json_str).map_err(|e| ExtractionError::Json(e.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for ChromeSession {
    type Context = Page;

    async fn open_context(&self) -> Result<Page, ExtractionError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| ExtractionError::BrowserInit(e.to_string()))
    }

    async fn navigate(&self, page: &Page, url: &str) -> Result<(), ExtractionError> {
        debug!("Navigating to {}", url);
        page.goto(url)
            .await
            .map_err(|e| ExtractionError::Navigation(e.to_string()))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| ExtractionError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn content(&self, page: &Page) -> Result<String, ExtractionError> {
        page.content()
            .await
            .map_err(|e| ExtractionError::JavaScript(e.to_string()))
    }

    async fn close_context(&self, page: Page) -> Result<(), ExtractionError> {
        page.close()
            .await
            .map_err(|e| ExtractionError::BrowserInit(format!("ページを閉じられません: {}", e)))
    }

    async fn scroll_feed(
        &self,
        page: &Page,
        selector: &str,
        distance: u32,
    ) -> Result<Option<FeedMetrics>, ExtractionError> {
        self.evaluate_metrics(page, scripts::scroll_feed(selector, distance))
            .await
    }

    async fn measure_feed(
        &self,
        page: &Page,
        selector: &str,
    ) -> Result<Option<FeedMetrics>, ExtractionError> {
        self.evaluate_metrics(page, scripts::measure_feed(selector))
            .await
    }

    async fn debug_snapshot(&self, page: &Page) -> Option<String> {
        if !self.debug {
            return None;
        }

        match page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            Ok(screenshot) => Some(base64::engine::general_purpose::STANDARD.encode(&screenshot)),
            Err(e) => {
                debug!("Failed to take screenshot: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchQuery;

    #[tokio::test]
    #[ignore] // 実環境テスト用: cargo test chrome_session_live -- --ignored --nocapture
    async fn test_chrome_session_live() {
        tracing_subscriber::fmt()
            .with_env_filter("info,maps_extractor=debug")
            .init();

        let config = ExtractorConfig::from_env();
        let session = ChromeSession::launch(&config)
            .await
            .expect("Failed to launch browser");

        let query = SearchQuery::new("coffee shops jakarta").unwrap();
        let url = query.search_url(&config.base_url).unwrap();

        let page = session.open_context().await.expect("Failed to open page");
        session.navigate(&page, url.as_str()).await.expect("Navigation failed");
        let metrics = session
            .measure_feed(&page, crate::config::FEED_SELECTOR)
            .await
            .expect("Measure failed");
        println!("Feed metrics: {:?}", metrics);

        session.close_context(page).await.expect("Failed to close page");
        session.shutdown(Duration::ZERO).await;
    }
}
