use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::types::FeedMetrics;

/// パイプラインが必要とするブラウザ操作
///
/// 実装は `ChromeSession`。テストではモックに差し替える。
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// 独立したページコンテキスト
    type Context: Send + Sync;

    /// 新しいページを開く
    async fn open_context(&self) -> Result<Self::Context, ExtractionError>;

    /// URLへ遷移
    async fn navigate(&self, context: &Self::Context, url: &str) -> Result<(), ExtractionError>;

    /// 描画済みHTMLを取得
    async fn content(&self, context: &Self::Context) -> Result<String, ExtractionError>;

    /// ページを閉じる（コンテキストごとに1回だけ呼ばれる）
    async fn close_context(&self, context: Self::Context) -> Result<(), ExtractionError>;

    /// スクロール前の高さを計測してから `distance` だけスクロール
    ///
    /// コンテナが存在しなければ `Ok(None)`。
    async fn scroll_feed(
        &self,
        context: &Self::Context,
        selector: &str,
        distance: u32,
    ) -> Result<Option<FeedMetrics>, ExtractionError>;

    /// スクロールせずに高さだけを計測
    async fn measure_feed(
        &self,
        context: &Self::Context,
        selector: &str,
    ) -> Result<Option<FeedMetrics>, ExtractionError>;

    /// デバッグ用スクリーンショット (base64 PNG)
    async fn debug_snapshot(&self, _context: &Self::Context) -> Option<String> {
        None
    }
}
