//! 抽出パイプライン全体で共有する型定義

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::ExtractionError;

/// オペレーターが入力した検索クエリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// 前後の空白を除去し、空なら `InvalidQuery`
    pub fn new(query: impl AsRef<str>) -> Result<Self, ExtractionError> {
        let query = query.as_ref().trim();
        if query.is_empty() {
            return Err(ExtractionError::InvalidQuery);
        }
        Ok(Self(query.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<base>/maps/search/<単語を+で連結>`
    pub fn search_url(&self, base_url: &str) -> Result<Url, ExtractionError> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ExtractionError::Navigation(format!("{}: {}", base_url, e)))?;
        let terms = self.0.split_whitespace().collect::<Vec<_>>().join("+");

        url.path_segments_mut()
            .map_err(|_| ExtractionError::Navigation(format!("不正なベースURL: {}", base_url)))?
            .pop_if_empty()
            .extend(["maps", "search", terms.as_str()]);

        Ok(url)
    }

    /// 小文字化し、空白とパス区切りを `_` に置換したファイル名用の文字列
    pub fn slug(&self) -> String {
        self.0
            .to_lowercase()
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                other => other,
            })
            .collect()
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.slug())
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 検索フィードの1エントリ（詳細ページ未訪問）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingCandidate {
    pub detail_url: Option<String>,
    pub category: Option<String>,
    pub rating_label: Option<String>,
    pub name: String,
    pub website: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl ListingCandidate {
    /// 空文字列のURLは未設定と同じ扱い
    pub fn usable_detail_url(&self) -> Option<&str> {
        self.detail_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// 詳細ページを使わずリスト上の情報だけでレコードを作る
    pub fn into_listing_record(self) -> Option<BusinessRecord> {
        let google_url = self.usable_detail_url()?.to_string();
        Some(BusinessRecord {
            name: self.name,
            website: self.website,
            category: self.category,
            address: self.address,
            phone: self.phone,
            google_url,
            rating_label: self.rating_label,
        })
    }
}

/// 詳細ページ `div[role="main"]` から取得した項目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub name: String,
    pub website: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// 最終的な出力行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessRecord {
    pub name: String,
    pub website: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub google_url: String,
    pub rating_label: Option<String>,
}

impl BusinessRecord {
    /// カテゴリと評価はリスト側、それ以外は詳細ページ側を採用
    pub fn merge(candidate: &ListingCandidate, google_url: &str, detail: DetailFields) -> Self {
        Self {
            name: detail.name,
            website: detail.website,
            category: candidate.category.clone(),
            address: detail.address,
            phone: detail.phone,
            google_url: google_url.to_string(),
            rating_label: candidate.rating_label.clone(),
        }
    }

    /// CSVの列順に並べたセル値（未設定は空文字列）
    pub fn cells(&self) -> [&str; 7] {
        [
            self.name.as_str(),
            self.website.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default(),
            self.address.as_deref().unwrap_or_default(),
            self.phone.as_deref().unwrap_or_default(),
            self.google_url.as_str(),
            self.rating_label.as_deref().unwrap_or_default(),
        ]
    }
}

/// 1クエリ分の抽出結果
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub query: SearchQuery,
    pub records: Vec<BusinessRecord>,
}

/// 詳細ページ補完の失敗理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    OpenContext,
    Navigation,
    Content,
    MissingMainRegion,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::OpenContext => "open-context",
            FailureKind::Navigation => "navigation",
            FailureKind::Content => "content",
            FailureKind::MissingMainRegion => "missing-main-region",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentFailure {
    /// 収集順のインデックス
    pub index: usize,
    pub detail_url: String,
    pub kind: FailureKind,
    pub message: String,
}

/// in-page スクリプトが返すフィードの計測値
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMetrics {
    pub scroll_height: f64,
}

/// スクロール完了時の統計
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOutcome {
    pub steps: usize,
    pub settle_cycles: usize,
    pub final_height: f64,
}

/// 実行レポート（結果 + サマリー）
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub result: ExtractionResult,
    /// 収集した候補の総数
    pub candidates: usize,
    /// 詳細URLがなく除外した件数
    pub missing_detail_url: usize,
    pub failures: Vec<EnrichmentFailure>,
    pub scroll: ScrollOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub csv_path: Option<PathBuf>,
}

impl ExtractionReport {
    /// 候補のうちレコードにならなかった件数
    pub fn dropped(&self) -> usize {
        self.missing_detail_url + self.failures.len()
    }
}
