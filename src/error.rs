use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("検索クエリが空です")]
    InvalidQuery,

    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("JSON解析エラー: {0}")]
    Json(String),

    #[error("検索結果フィードが見つかりません: {0}")]
    FeedUnavailable(String),

    #[error("スクロールが{steps}ステップ以内に収束しませんでした")]
    FeedTimeout { steps: usize },

    #[error("処理がキャンセルされました")]
    Cancelled,

    #[error("CSV書き込みエラー: {0}")]
    Serialization(#[from] csv::Error),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}
