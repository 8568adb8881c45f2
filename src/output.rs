//! 抽出結果をCSVファイルに書き出す
//!
//! 各セルからは `,` を取り除いてから二重引用符で囲む（エスケープではなく削除）。
//! ヘッダー行は引用符なし。ファイルは毎回まるごと上書きする。

use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::error::ExtractionError;
use crate::types::ExtractionResult;

pub const CSV_HEADER: &str = "Name,Website,Category,Address,Phone,GoogleUrl,RatingText";

fn strip_delimiters(value: &str) -> String {
    value.replace(',', "")
}

/// CSVの内容をメモリ上で組み立てる
pub fn render_csv(result: &ExtractionResult) -> Result<Vec<u8>, ExtractionError> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(CSV_HEADER.as_bytes());
    buffer.push(b'\n');

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);

    for record in &result.records {
        writer.write_record(record.cells().iter().map(|cell| strip_delimiters(cell)))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExtractionError::FileIO(e.into_error()))
}

/// `<output_dir>/<slug>.csv` に書き出してパスを返す
pub fn write_csv(result: &ExtractionResult, output_dir: &Path) -> Result<PathBuf, ExtractionError> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(result.query.file_name());
    let content = render_csv(result)?;
    std::fs::write(&path, content)?;

    info!(
        "CSV file created: {:?} ({} records)",
        path,
        result.records.len()
    );
    Ok(path)
}
