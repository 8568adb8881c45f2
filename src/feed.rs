//! 無限スクロールするフィードを末尾まで読み込む
//!
//! 短い間隔でスクロールを繰り返し、累積スクロール量がスクロール前の高さに
//! 達したら長めの待機（settle）を挟んで高さを再計測する。高さが伸びていなければ完了。

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::traits::BrowserDriver;
use crate::types::{FeedMetrics, ScrollOutcome};

/// 検索フィードの表示待ちのポーリング間隔
const FEED_WAIT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ScrollDetector {
    selector: String,
    distance: u32,
    poll_interval: Duration,
    settle_delay: Duration,
    max_steps: usize,
}

impl ScrollDetector {
    pub fn new(selector: impl Into<String>, config: &ExtractorConfig) -> Self {
        Self {
            selector: selector.into(),
            distance: config.scroll_distance,
            poll_interval: config.poll_interval,
            settle_delay: config.settle_delay,
            max_steps: config.max_scroll_steps,
        }
    }

    /// フィードの高さが伸びなくなるまでスクロール
    pub async fn run<D: BrowserDriver>(
        &self,
        driver: &D,
        context: &D::Context,
        cancel: &CancellationToken,
    ) -> Result<ScrollOutcome, ExtractionError> {
        let mut outcome = ScrollOutcome::default();
        let mut total = 0f64;

        loop {
            if cancel.is_cancelled() {
                return Err(ExtractionError::Cancelled);
            }
            if outcome.steps >= self.max_steps {
                return Err(ExtractionError::FeedTimeout {
                    steps: outcome.steps,
                });
            }

            let before = driver
                .scroll_feed(context, &self.selector, self.distance)
                .await?;
            let before = self.require(before)?;
            outcome.steps += 1;
            total += f64::from(self.distance);

            if total < before.scroll_height {
                pause(self.poll_interval, cancel).await?;
                continue;
            }

            // 末尾の可能性: 追加読み込みを待って再計測
            total = 0.0;
            outcome.settle_cycles += 1;
            pause(self.settle_delay, cancel).await?;

            let after = self.require(driver.measure_feed(context, &self.selector).await?)?;
            outcome.final_height = after.scroll_height;

            if after.scroll_height <= before.scroll_height {
                info!(
                    "Feed settled: height={} steps={} settle_cycles={}",
                    after.scroll_height, outcome.steps, outcome.settle_cycles
                );
                return Ok(outcome);
            }

            debug!(
                "Feed grew {} -> {}, resuming scroll",
                before.scroll_height, after.scroll_height
            );
        }
    }

    /// フィードが表示されるまで待機
    pub async fn wait_for_feed<D: BrowserDriver>(
        &self,
        driver: &D,
        context: &D::Context,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<FeedMetrics, ExtractionError> {
        let start = tokio::time::Instant::now();

        loop {
            if let Some(metrics) = driver.measure_feed(context, &self.selector).await? {
                debug!("Feed detected after {:?}", start.elapsed());
                return Ok(metrics);
            }
            if start.elapsed() >= timeout {
                return Err(ExtractionError::FeedUnavailable(format!(
                    "{} ({:?}以内に表示されませんでした)",
                    self.selector, timeout
                )));
            }
            pause(FEED_WAIT_INTERVAL, cancel).await?;
        }
    }

    fn require(&self, metrics: Option<FeedMetrics>) -> Result<FeedMetrics, ExtractionError> {
        metrics.ok_or_else(|| ExtractionError::FeedUnavailable(self.selector.clone()))
    }
}

/// キャンセル可能な待機
async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), ExtractionError> {
    tokio::select! {
        _ = sleep(duration) => Ok(()),
        _ = cancel.cancelled() => Err(ExtractionError::Cancelled),
    }
}
