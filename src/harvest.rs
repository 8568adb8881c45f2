//! スクロール完了後のHTMLから候補を収集

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::extract::extract_listing;
use crate::types::ListingCandidate;

/// 詳細ページへのリンクを示すパス
pub const PLACE_PATH: &str = "/maps/place/";

/// `/maps/place/` を含むリンクの親要素を候補として文書順に返す
///
/// 重複は除去しない。該当リンクがなければ空。
pub fn harvest(html: &str, base_url: &Url, website_labels: &[String]) -> Vec<ListingCandidate> {
    let document = Html::parse_document(html);
    let Ok(links) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let candidates: Vec<ListingCandidate> = document
        .select(&links)
        .filter(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| href.contains(PLACE_PATH))
        })
        .filter_map(|link| link.parent().and_then(ElementRef::wrap))
        .map(|container| {
            let mut candidate = extract_listing(container, website_labels);
            candidate.detail_url = candidate
                .detail_url
                .map(|href| resolve(base_url, &href));
            candidate
        })
        .collect();

    debug!("Harvested {} candidates", candidates.len());
    candidates
}

/// 相対URLを検索ページ基準で絶対URLにする
fn resolve(base_url: &Url, href: &str) -> String {
    base_url
        .join(href)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}
