//! リスト / 詳細ページのDOMから項目を取り出す
//!
//! どの項目もDOM上に存在しなければ `None` になる。ノードが見つかったが
//! テキストが空の場合は `Some("")`。どちらもCSVでは空セルになる。

use scraper::{ElementRef, Html, Selector};

use crate::types::{DetailFields, ListingCandidate};

/// カテゴリ・住所・電話番号を区切る中黒
const MIDDLE_DOT: char = '·';

const LISTING_NAME: &str = "div.fontHeadlineSmall";
const LISTING_RATING: &str = "span.fontBodyMedium > span";
const LISTING_INFO: &str = "div.fontBodyMedium";

const DETAIL_MAIN: &str = r#"div[role="main"]"#;
const DETAIL_REGION: &str = r#"div[role="region"]"#;
const DETAIL_WEBSITE: &str = r#"div > a[data-item-id="authority"]"#;
const DETAIL_ADDRESS: &str = r#"button[data-item-id="address"] > div"#;
const DETAIL_PHONE: &str = r#"button[data-item-id*="phone"] > div"#;

fn first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl DoubleEndedIterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// `·` で区切った `index` 番目の断片
fn segment(line: Option<&str>, index: usize) -> Option<String> {
    line?
        .split(MIDDLE_DOT)
        .nth(index)
        .map(|part| part.trim().to_string())
}

/// 情報ブロック最後の子要素の、最初と最後の行
#[derive(Debug, Default)]
struct InfoLines {
    first: Option<String>,
    last: Option<String>,
}

impl InfoLines {
    fn from_container(container: ElementRef<'_>) -> Self {
        let Some(block) = first(container, LISTING_INFO).and_then(|body| child_elements(body).last())
        else {
            return Self::default();
        };

        let mut lines = child_elements(block);
        let first_line = lines.next();
        let last_line = lines.next_back().or(first_line);

        Self {
            first: first_line.map(text),
            last: last_line.map(text),
        }
    }
}

/// 検索フィード上のコンテナから候補を作る
pub fn extract_listing(container: ElementRef<'_>, website_labels: &[String]) -> ListingCandidate {
    let info = InfoLines::from_container(container);

    let website = website_labels.iter().find_map(|label| {
        let css = format!(r#"a[data-value="{}"]"#, label.replace('"', "\\\""));
        first(container, &css).and_then(|link| attr(link, "href"))
    });

    ListingCandidate {
        detail_url: first(container, "a").and_then(|link| attr(link, "href")),
        category: segment(info.first.as_deref(), 0),
        rating_label: first(container, LISTING_RATING).and_then(|span| attr(span, "aria-label")),
        name: first(container, LISTING_NAME).map(text).unwrap_or_default(),
        website,
        address: segment(info.first.as_deref(), 1),
        phone: segment(info.last.as_deref(), 1),
    }
}

/// 詳細ページの `button > div` から最後の子要素の先頭行を取る
fn item_line(main: ElementRef<'_>, regions: &Selector, css: &str) -> Option<String> {
    let button = main.select(regions).find_map(|region| first(region, css))?;
    let row = child_elements(button).last()?;
    child_elements(row).next().map(text)
}

/// 詳細ページのHTMLから項目を取り出す
///
/// `div[role="main"]` がなければ `None`。
pub fn extract_detail(html: &str) -> Option<DetailFields> {
    let document = Html::parse_document(html);
    let main_selector = Selector::parse(DETAIL_MAIN).ok()?;
    let main = document.select(&main_selector).next()?;
    let regions = Selector::parse(DETAIL_REGION).ok()?;

    Some(DetailFields {
        name: first(main, "h1").map(text).unwrap_or_default(),
        website: main
            .select(&regions)
            .find_map(|region| first(region, DETAIL_WEBSITE))
            .and_then(|link| attr(link, "href")),
        address: item_line(main, &regions, DETAIL_ADDRESS),
        phone: item_line(main, &regions, DETAIL_PHONE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["Website".to_string(), "Situs Web".to_string()]
    }

    fn container_of(html: &str, labels: &[String]) -> ListingCandidate {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse("div.entry").unwrap();
        let container = fragment.select(&selector).next().unwrap();
        extract_listing(container, labels)
    }

    const LISTING: &str = r#"
        <div class="entry">
          <a class="hfpxzc" href="https://www.google.com/maps/place/Kopi+Kenangan/data=!4m7"></a>
          <div class="bfdHYd">
            <div class="fontHeadlineSmall">Kopi Kenangan</div>
            <span class="fontBodyMedium"><span role="img" aria-label="4.5 stars 1,234 Reviews"></span></span>
            <div class="fontBodyMedium">
              <div>4.5 (1,234)</div>
              <div>
                <div><span>Coffee shop</span> · <span>Jl. Sudirman No. 1</span></div>
                <div><span>Open 24 hours</span> · <span>+62 21 555 0101</span></div>
              </div>
            </div>
            <a data-value="Situs Web" href="https://kopikenangan.test/">Situs Web</a>
          </div>
        </div>
    "#;

    #[test]
    fn test_listing_fields() {
        let candidate = container_of(LISTING, &labels());

        assert_eq!(
            candidate.detail_url.as_deref(),
            Some("https://www.google.com/maps/place/Kopi+Kenangan/data=!4m7")
        );
        assert_eq!(candidate.name, "Kopi Kenangan");
        assert_eq!(candidate.category.as_deref(), Some("Coffee shop"));
        assert_eq!(candidate.address.as_deref(), Some("Jl. Sudirman No. 1"));
        assert_eq!(candidate.phone.as_deref(), Some("+62 21 555 0101"));
        assert_eq!(candidate.rating_label.as_deref(), Some("4.5 stars 1,234 Reviews"));
        assert_eq!(candidate.website.as_deref(), Some("https://kopikenangan.test/"));
    }

    #[test]
    fn test_website_label_must_be_configured() {
        let candidate = container_of(LISTING, &["Website".to_string()]);
        assert_eq!(candidate.website, None);
    }

    #[test]
    fn test_missing_info_block_yields_empty_fields() {
        let candidate = container_of(
            r#"<div class="entry">
                 <a href="https://www.google.com/maps/place/X"></a>
                 <div class="fontHeadlineSmall">X</div>
               </div>"#,
            &labels(),
        );

        assert_eq!(candidate.name, "X");
        assert_eq!(candidate.category, None);
        assert_eq!(candidate.address, None);
        assert_eq!(candidate.phone, None);
        assert_eq!(candidate.rating_label, None);
    }

    #[test]
    fn test_single_line_without_delimiter() {
        let candidate = container_of(
            r#"<div class="entry">
                 <div class="fontBodyMedium"><div><div>Bakery</div></div></div>
               </div>"#,
            &labels(),
        );

        // 1行しかない場合は最初と最後が同じ行
        assert_eq!(candidate.category.as_deref(), Some("Bakery"));
        assert_eq!(candidate.address, None);
        assert_eq!(candidate.phone, None);
        assert_eq!(candidate.detail_url, None);
        assert_eq!(candidate.name, "");
    }

    const DETAIL: &str = r#"
        <html><body>
        <div role="main" aria-label="Kopi Kenangan">
          <h1 class="DUwDvf">Kopi Kenangan</h1>
          <div role="region" aria-label="Reviews"></div>
          <div role="region" aria-label="Information">
            <button data-item-id="address">
              <div class="AeaXub">
                <div class="icon"></div>
                <div class="rogA2c"><div class="Io6YTe">Jl. Jend. Sudirman No.1, Jakarta</div></div>
              </div>
            </button>
            <div class="rogA2c"><a data-item-id="authority" href="https://kopikenangan.test/">kopikenangan.test</a></div>
            <button data-item-id="phone:tel:+62215550101">
              <div class="AeaXub">
                <div class="icon"></div>
                <div class="rogA2c"><div class="Io6YTe">(021) 5550101</div></div>
              </div>
            </button>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_detail_fields() {
        let detail = extract_detail(DETAIL).unwrap();

        assert_eq!(detail.name, "Kopi Kenangan");
        assert_eq!(detail.website.as_deref(), Some("https://kopikenangan.test/"));
        assert_eq!(detail.address.as_deref(), Some("Jl. Jend. Sudirman No.1, Jakarta"));
        assert_eq!(detail.phone.as_deref(), Some("(021) 5550101"));
    }

    #[test]
    fn test_detail_without_main_region() {
        assert_eq!(extract_detail("<html><body><h1>Sorry</h1></body></html>"), None);
    }

    #[test]
    fn test_detail_without_info_region() {
        let detail = extract_detail(r#"<div role="main"><h1>Only a name</h1></div>"#).unwrap();
        assert_eq!(
            detail,
            DetailFields {
                name: "Only a name".to_string(),
                ..Default::default()
            }
        );
    }
}
