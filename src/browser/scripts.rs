//! in-page で評価するスクリプト
//!
//! 戻り値はすべて `JSON.stringify` した文字列。

/// セレクタ文字列をJSのリテラルに変換
fn js_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// 高さを計測してからスクロールする
pub(crate) fn scroll_feed(selector: &str, distance: u32) -> String {
    format!(
        r#"
        (() => {{
            const feed = document.querySelector({selector});
            if (!feed) return JSON.stringify(null);
            const scrollHeight = feed.scrollHeight;
            feed.scrollBy(0, {distance});
            return JSON.stringify({{ scrollHeight }});
        }})()
        "#,
        selector = js_literal(selector),
        distance = distance,
    )
}

/// 高さのみ計測
pub(crate) fn measure_feed(selector: &str) -> String {
    format!(
        r#"
        (() => {{
            const feed = document.querySelector({selector});
            if (!feed) return JSON.stringify(null);
            return JSON.stringify({{ scrollHeight: feed.scrollHeight }});
        }})()
        "#,
        selector = js_literal(selector),
    )
}
