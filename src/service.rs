use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::info;

use crate::browser::ChromeSession;
use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::output::write_csv;
use crate::pipeline::Pipeline;
use crate::types::{ExtractionReport, SearchQuery};

/// 抽出リクエスト
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub output_dir: Option<PathBuf>,
    pub headless: Option<bool>,
    pub enrich_details: Option<bool>,
    pub cancel: CancellationToken,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            output_dir: None,
            headless: None,
            enrich_details: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    pub fn with_enrich_details(mut self, enrich: bool) -> Self {
        self.enrich_details = Some(enrich);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// サービスの既定設定にリクエスト側の指定を重ねる
    fn apply(&self, base: &ExtractorConfig) -> ExtractorConfig {
        let mut config = base.clone();
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(enrich) = self.enrich_details {
            config.enrich_details = enrich;
        }
        config
    }
}

/// tower::Serviceを実装した抽出サービス
///
/// 1リクエストごとにブラウザを起動し、終了後に閉じる。
#[derive(Debug, Clone, Default)]
pub struct ExtractionService {
    config: ExtractorConfig,
}

impl ExtractionService {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl Service<SearchRequest> for ExtractionService {
    type Response = ExtractionReport;
    type Error = ExtractionError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SearchRequest) -> Self::Future {
        info!("Extraction request received: query=\"{}\"", req.query);
        let config = req.apply(&self.config);

        Box::pin(async move {
            let query = SearchQuery::new(&req.query)?;
            let grace = config.browser_close_grace;
            let output_dir = config.output_dir.clone();

            let session = ChromeSession::launch(&config).await?;
            let pipeline = Pipeline::new(config);
            let outcome = pipeline.run(&session, &query, &req.cancel).await;
            session.shutdown(grace).await;

            let mut report = outcome?;
            let csv_path = write_csv(&report.result, &output_dir)?;
            report.csv_path = Some(csv_path);

            Ok(report)
        })
    }
}
