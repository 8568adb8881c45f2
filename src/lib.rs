//! Googleマップ検索結果スクレイパー
//!
//! - 検索フィードを末尾までスクロール
//! - 各エントリを収集し、詳細ページを開いて項目を補完
//! - `result/<クエリ>.csv` に出力
//!
//! # 使用例
//!
//! ```rust,ignore
//! use maps_extractor::{ExtractionService, ExtractorConfig, SearchRequest};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ExtractorConfig::from_env().with_headless(false);
//!     let mut service = ExtractionService::new(config);
//!
//!     let report = service
//!         .call(SearchRequest::new("coffee shops jakarta"))
//!         .await
//!         .unwrap();
//!     println!("CSV: {:?} ({} records)", report.csv_path, report.result.records.len());
//! }
//! ```
//!
//! # ブラウザを差し替える
//!
//! ```rust,ignore
//! use maps_extractor::{ChromeSession, ExtractorConfig, Pipeline, SearchQuery};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ExtractorConfig::default();
//! let session = ChromeSession::launch(&config).await?;
//! let query = SearchQuery::new("bakery bandung")?;
//! let report = Pipeline::new(config.clone())
//!     .run(&session, &query, &CancellationToken::new())
//!     .await;
//! session.shutdown(config.browser_close_grace).await;
//! ```

pub mod browser;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod feed;
pub mod harvest;
pub mod output;
pub mod pipeline;
pub mod service;
pub mod traits;
pub mod types;

#[cfg(test)]
mod mock;

// 主要な型をリエクスポート
pub use browser::ChromeSession;
pub use config::ExtractorConfig;
pub use error::ExtractionError;
pub use pipeline::Pipeline;
pub use service::{ExtractionService, SearchRequest};
pub use traits::BrowserDriver;
pub use types::{
    BusinessRecord, EnrichmentFailure, ExtractionReport, ExtractionResult, FailureKind,
    ListingCandidate, SearchQuery,
};
