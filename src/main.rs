use std::future::poll_fn;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dialoguer::{Input, Select};
use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use maps_extractor::{ExtractionReport, ExtractionService, ExtractorConfig, SearchRequest};

/// Googleマップの検索結果をCSVに出力する
#[derive(Parser, Debug)]
#[command(name = "maps-extractor", version)]
struct Args {
    /// 最初のクエリ（省略時はプロンプトで入力）
    query: Option<String>,

    /// ブラウザウィンドウを表示する
    #[arg(long)]
    show_browser: bool,

    /// CSV出力先
    #[arg(long, default_value = "result")]
    output_dir: PathBuf,

    /// 詳細ページを開かずリスト上の情報だけで出力する
    #[arg(long)]
    listing_only: bool,

    /// 同時に開く詳細ページ数
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// 詳細ページを閉じる前の待機 (ミリ秒)
    #[arg(long, default_value_t = 0)]
    page_close_delay_ms: u64,

    /// ウェブサイトリンクの追加ラベル (例: "Sitio web")
    #[arg(long = "website-label")]
    website_labels: Vec<String>,

    /// スクロールステップ数の上限
    #[arg(long, default_value_t = 2000)]
    max_scroll_steps: usize,

    /// デバッグログとスクリーンショットを有効化
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn config(&self) -> ExtractorConfig {
        let config = ExtractorConfig::from_env()
            .with_headless(!self.show_browser)
            .with_output_dir(&self.output_dir)
            .with_enrich_details(!self.listing_only)
            .with_max_concurrent_pages(self.concurrency)
            .with_page_close_delay(Duration::from_millis(self.page_close_delay_ms))
            .with_max_scroll_steps(self.max_scroll_steps)
            .with_debug(self.debug);

        self.website_labels
            .iter()
            .fold(config, |config, label| config.with_website_label(label))
    }
}

async fn prompt_query() -> Result<String> {
    let query = tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Query")
            .interact_text()
    })
    .await??;
    Ok(query)
}

async fn prompt_continue() -> Result<bool> {
    let choice = tokio::task::spawn_blocking(|| {
        Select::new()
            .with_prompt("Use again?")
            .items(&["Yes", "Stop"])
            .default(0)
            .interact()
    })
    .await??;
    Ok(choice == 0)
}

fn print_summary(report: &ExtractionReport) {
    println!("\n=== Extraction Result ===");
    println!("Query: {}", report.result.query);
    println!("Candidates: {}", report.candidates);
    println!("Records: {}", report.result.records.len());
    println!(
        "Dropped: {} (no detail URL: {}, failed: {})",
        report.dropped(),
        report.missing_detail_url,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  - #{} {} [{}]", failure.index, failure.detail_url, failure.kind);
    }
    if let Some(path) = &report.csv_path {
        println!("CSV: {}", path.display());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "info,maps_extractor=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mut service = ExtractionService::new(args.config());
    let mut next_query = args.query.clone();

    loop {
        let query = match next_query.take() {
            Some(query) => query,
            None => prompt_query().await?,
        };

        // Ctrl-C で実行中のクエリだけを中断
        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling current query...");
                    cancel.cancel();
                }
            })
        };

        poll_fn(|cx| service.poll_ready(cx)).await?;
        match service.call(SearchRequest::new(query).with_cancel(cancel)).await {
            Ok(report) => print_summary(&report),
            Err(e) => error!("Extraction failed: {}", e),
        }
        interrupt.abort();

        if !prompt_continue().await? {
            info!("Process stopped.");
            break;
        }
    }

    Ok(())
}
