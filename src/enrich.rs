//! 詳細ページを開いて候補を補完する
//!
//! 候補ごとにページを1つ開き、遷移・取得・抽出の成否にかかわらず必ず閉じる。
//! 同時実行数は `max_concurrent_pages` で制限し、出力は常に収集順。

use std::time::Duration;

use futures::stream::{FuturesOrdered, StreamExt};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::extract::extract_detail;
use crate::traits::BrowserDriver;
use crate::types::{
    BusinessRecord, DetailFields, EnrichmentFailure, FailureKind, ListingCandidate,
};

/// 補完処理の結果
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
    pub records: Vec<BusinessRecord>,
    pub failures: Vec<EnrichmentFailure>,
    pub missing_detail_url: usize,
}

impl EnrichmentOutcome {
    /// 詳細ページを使わない場合: リスト上の情報をそのままレコードにする
    pub fn from_listings(candidates: Vec<ListingCandidate>) -> Self {
        let mut outcome = Self::default();
        for candidate in candidates {
            match candidate.into_listing_record() {
                Some(record) => outcome.records.push(record),
                None => outcome.missing_detail_url += 1,
            }
        }
        outcome
    }
}

enum Enriched {
    Record(BusinessRecord),
    Failed(EnrichmentFailure),
}

pub struct Enricher<'a, D: BrowserDriver> {
    driver: &'a D,
    page_close_delay: Duration,
    max_concurrent: usize,
}

impl<'a, D: BrowserDriver> Enricher<'a, D> {
    pub fn new(driver: &'a D, config: &ExtractorConfig) -> Self {
        Self {
            driver,
            page_close_delay: config.page_close_delay,
            max_concurrent: config.max_concurrent_pages.max(1),
        }
    }

    /// 全候補を補完
    ///
    /// 個々の失敗は `failures` に記録して続行する。キャンセル時は開いている
    /// ページを全て閉じてから `Cancelled` を返す。
    pub async fn enrich_all(
        &self,
        candidates: Vec<ListingCandidate>,
        cancel: &CancellationToken,
    ) -> Result<EnrichmentOutcome, ExtractionError> {
        let mut outcome = EnrichmentOutcome::default();
        let mut targets = Vec::with_capacity(candidates.len());

        for (index, candidate) in candidates.into_iter().enumerate() {
            match candidate.usable_detail_url().map(str::to_string) {
                Some(url) => targets.push((index, url, candidate)),
                None => outcome.missing_detail_url += 1,
            }
        }

        info!(
            "Enriching {} candidates ({} without detail URL, concurrency={})",
            targets.len(),
            outcome.missing_detail_url,
            self.max_concurrent
        );

        // FuturesOrdered は完了順ではなく投入順で結果を返す
        let mut targets = targets.into_iter();
        let mut pending = FuturesOrdered::new();
        let mut results = Vec::new();

        loop {
            while pending.len() < self.max_concurrent {
                let Some((index, url, candidate)) = targets.next() else {
                    break;
                };
                pending.push_back(self.enrich_one(index, url, candidate, cancel));
            }
            match pending.next().await {
                Some(result) => results.push(result),
                None => break,
            }
        }

        // キャンセルされても全ページを閉じ終えてから返す
        for result in results {
            match result? {
                Enriched::Record(record) => outcome.records.push(record),
                Enriched::Failed(failure) => outcome.failures.push(failure),
            }
        }

        info!(
            "Enrichment done: {} records, {} failed",
            outcome.records.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn enrich_one(
        &self,
        index: usize,
        url: String,
        candidate: ListingCandidate,
        cancel: &CancellationToken,
    ) -> Result<Enriched, ExtractionError> {
        if cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }

        let page = match self.driver.open_context().await {
            Ok(page) => page,
            Err(e) => return Ok(self.failed(index, url, FailureKind::OpenContext, e.to_string())),
        };

        let visited = tokio::select! {
            result = self.visit(&page, &url) => Some(result),
            _ = cancel.cancelled() => None,
        };

        self.release(page).await;

        match visited {
            None => Err(ExtractionError::Cancelled),
            Some(Ok(detail)) => {
                debug!("[{}] Enriched {}", index, detail.name);
                Ok(Enriched::Record(BusinessRecord::merge(&candidate, &url, detail)))
            }
            Some(Err((kind, message))) => Ok(self.failed(index, url, kind, message)),
        }
    }

    async fn visit(
        &self,
        page: &D::Context,
        url: &str,
    ) -> Result<DetailFields, (FailureKind, String)> {
        self.driver
            .navigate(page, url)
            .await
            .map_err(|e| (FailureKind::Navigation, e.to_string()))?;

        let html = self
            .driver
            .content(page)
            .await
            .map_err(|e| (FailureKind::Content, e.to_string()))?;

        extract_detail(&html).ok_or_else(|| {
            (
                FailureKind::MissingMainRegion,
                "div[role=\"main\"] が見つかりません".to_string(),
            )
        })
    }

    /// ページを閉じる（必要なら待機してから）
    async fn release(&self, page: D::Context) {
        if !self.page_close_delay.is_zero() {
            sleep(self.page_close_delay).await;
        }
        if let Err(e) = self.driver.close_context(page).await {
            warn!("Failed to close page: {}", e);
        }
    }

    fn failed(&self, index: usize, url: String, kind: FailureKind, message: String) -> Enriched {
        warn!("[{}] Skipping {} ({}): {}", index, url, kind, message);
        Enriched::Failed(EnrichmentFailure {
            index,
            detail_url: url,
            kind,
            message,
        })
    }
}
