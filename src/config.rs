use std::path::PathBuf;
use std::time::Duration;

/// 検索フィードを表すコンテナのセレクタ
pub const FEED_SELECTOR: &str = "div[role=\"feed\"]";

/// 既定のウェブサイトリンクのラベル（英語版 / インドネシア語版）
pub const DEFAULT_WEBSITE_LABELS: &[&str] = &["Website", "Situs Web"];

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// 検索URLの基点 (例: "https://www.google.com")
    pub base_url: String,
    /// CSV出力先ディレクトリ
    pub output_dir: PathBuf,
    pub headless: bool,
    pub debug: bool,
    /// Chrome実行ファイル (未指定時はchromiumoxideの自動検出)
    pub chrome_path: Option<PathBuf>,
    /// CDPリクエストタイムアウト
    pub timeout: Duration,
    /// 1ステップあたりのスクロール量 (px)
    pub scroll_distance: u32,
    /// スクロールのポーリング間隔
    pub poll_interval: Duration,
    /// 末尾到達時に追加読み込みを待つ時間
    pub settle_delay: Duration,
    /// スクロールステップ数の上限
    pub max_scroll_steps: usize,
    /// 検索後、フィードの出現を待つ最大時間
    pub feed_wait: Duration,
    /// 詳細ページを閉じる前の待機時間
    pub page_close_delay: Duration,
    /// ブラウザ終了前の猶予時間
    pub browser_close_grace: Duration,
    /// 同時に開く詳細ページ数の上限
    pub max_concurrent_pages: usize,
    /// 詳細ページを開いて情報を補完するか
    pub enrich_details: bool,
    /// リスト上のウェブサイトリンクを識別する data-value ラベル
    pub website_labels: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com".to_string(),
            output_dir: PathBuf::from("./result"),
            headless: true,
            debug: false,
            chrome_path: None,
            timeout: Duration::from_secs(60),
            scroll_distance: 1000,
            poll_interval: Duration::from_millis(200),
            settle_delay: Duration::from_secs(3),
            max_scroll_steps: 2000,
            feed_wait: Duration::from_secs(10),
            page_close_delay: Duration::ZERO,
            browser_close_grace: Duration::ZERO,
            max_concurrent_pages: 1,
            enrich_details: true,
            website_labels: DEFAULT_WEBSITE_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
        }
    }
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数 CHROME_PATH / CHROMIUM_PATH を反映した設定
    pub fn from_env() -> Self {
        let chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .ok()
            .map(PathBuf::from);

        Self {
            chrome_path,
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scroll(mut self, distance: u32, poll_interval: Duration, settle_delay: Duration) -> Self {
        self.scroll_distance = distance;
        self.poll_interval = poll_interval;
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_max_scroll_steps(mut self, steps: usize) -> Self {
        self.max_scroll_steps = steps;
        self
    }

    pub fn with_feed_wait(mut self, wait: Duration) -> Self {
        self.feed_wait = wait;
        self
    }

    pub fn with_page_close_delay(mut self, delay: Duration) -> Self {
        self.page_close_delay = delay;
        self
    }

    pub fn with_browser_close_grace(mut self, grace: Duration) -> Self {
        self.browser_close_grace = grace;
        self
    }

    /// 0 は 1 として扱う
    pub fn with_max_concurrent_pages(mut self, pages: usize) -> Self {
        self.max_concurrent_pages = pages.max(1);
        self
    }

    pub fn with_enrich_details(mut self, enrich: bool) -> Self {
        self.enrich_details = enrich;
        self
    }

    /// 既定ラベルに追加のロケール別ラベルを加える
    pub fn with_website_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !self.website_labels.contains(&label) {
            self.website_labels.push(label);
        }
        self
    }
}
