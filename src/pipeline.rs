//! 1クエリ分の抽出処理
//!
//! 検索 → スクロール → 収集 → 補完 の順に一方向に進む。

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ExtractorConfig, FEED_SELECTOR};
use crate::enrich::{Enricher, EnrichmentOutcome};
use crate::error::ExtractionError;
use crate::feed::ScrollDetector;
use crate::harvest::harvest;
use crate::traits::BrowserDriver;
use crate::types::{ExtractionReport, ExtractionResult, ScrollOutcome, SearchQuery};

pub struct Pipeline {
    config: ExtractorConfig,
}

impl Pipeline {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// クエリを実行してレポートを返す（CSVは書き出さない）
    pub async fn run<D: BrowserDriver>(
        &self,
        driver: &D,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<ExtractionReport, ExtractionError> {
        let started_at = Utc::now();
        let search_url = query.search_url(&self.config.base_url)?;
        info!("Starting extraction: query=\"{}\" url={}", query, search_url);

        // 検索ページは読み込み後すぐ閉じる
        let page = driver.open_context().await?;
        let loaded = self.load_feed(driver, &page, search_url.as_str(), cancel).await;
        if let Err(e) = driver.close_context(page).await {
            warn!("Failed to close search page: {}", e);
        }
        let (snapshot, scroll) = loaded?;

        let candidates = harvest(&snapshot, &search_url, &self.config.website_labels);
        drop(snapshot);
        let total = candidates.len();
        info!("Found {} listing candidates", total);

        let outcome = if self.config.enrich_details {
            Enricher::new(driver, &self.config)
                .enrich_all(candidates, cancel)
                .await?
        } else {
            debug!("Detail enrichment disabled, using listing fields");
            EnrichmentOutcome::from_listings(candidates)
        };

        let report = ExtractionReport {
            result: ExtractionResult {
                query: query.clone(),
                records: outcome.records,
            },
            candidates: total,
            missing_detail_url: outcome.missing_detail_url,
            failures: outcome.failures,
            scroll,
            started_at,
            finished_at: Utc::now(),
            csv_path: None,
        };

        info!(
            "Extraction finished: {} records, {} dropped, elapsed={}s",
            report.result.records.len(),
            report.dropped(),
            (report.finished_at - report.started_at).num_seconds()
        );
        Ok(report)
    }

    /// 検索ページを開き、フィードを末尾まで読み込んでHTMLを返す
    async fn load_feed<D: BrowserDriver>(
        &self,
        driver: &D,
        page: &D::Context,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<(String, ScrollOutcome), ExtractionError> {
        driver.navigate(page, url).await?;

        let detector = ScrollDetector::new(FEED_SELECTOR, &self.config);
        if let Err(e) = detector
            .wait_for_feed(driver, page, self.config.feed_wait, cancel)
            .await
        {
            if let Some(screenshot) = driver.debug_snapshot(page).await {
                debug!("Search page screenshot: data:image/png;base64,{}", screenshot);
            }
            return Err(e);
        }

        let scroll = detector.run(driver, page, cancel).await?;
        let snapshot = driver.content(page).await?;
        debug!("Feed snapshot: {} bytes", snapshot.len());

        Ok((snapshot, scroll))
    }
}
