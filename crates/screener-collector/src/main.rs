//! Stock screener collector CLI.

use clap::{Parser, Subcommand};
use screener_collector::modules::seed_symbols_from_csv;
use screener_collector::{ingest_fundamentals, CollectorConfig, IngestOptions};
use screener_core::{init_logging, LogConfig, DEFAULT_EXCHANGE};
use screener_data::{list_dashboard_rows, PgScreenerStore, YahooFundamentalsClient};

#[derive(Parser)]
#[command(name = "screener-collector")]
#[command(about = "Stock screener fundamentals collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 스키마 생성 (마이그레이션 실행)
    InitSchema,

    /// CSV 파일로 추적 종목 시드
    SeedSymbols {
        /// CSV 파일 경로 (Symbol[,Exchange] 헤더)
        #[arg(long)]
        file: std::path::PathBuf,

        /// Exchange 컬럼이 비어 있을 때 사용할 거래소
        #[arg(long, default_value = DEFAULT_EXCHANGE)]
        exchange: String,
    },

    /// 재무 지표 한 배치 수집
    Ingest {
        /// 선택할 종목 수 (기본: FUNDAMENTAL_BATCH_SIZE)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// 대시보드 행을 JSON으로 출력
    Dashboard {
        /// 조회할 종목 수
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(LogConfig::from_env(format!(
        "screener_collector={0},screener_data={0}",
        cli.log_level
    )))?;

    tracing::info!("Stock screener collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        batch_size = config.ingest.batch_size,
        concurrency = config.ingest.concurrency,
        "설정 로드 완료"
    );

    // DB 연결
    let store = PgScreenerStore::connect(&config.storage).await?;

    match cli.command {
        Commands::InitSchema => {
            store.migrate().await?;
        }
        Commands::SeedSymbols { file, exchange } => {
            let content = tokio::fs::read_to_string(&file).await?;
            let result = seed_symbols_from_csv(&store, &content, &exchange).await?;
            tracing::info!(
                file = %file.display(),
                processed = result.total_processed,
                upserted = result.upserted,
                skipped = result.skipped,
                "추적 종목 시드 완료"
            );
        }
        Commands::Ingest { batch_size } => {
            let provider = YahooFundamentalsClient::new(&config.provider)?;
            let mut options = IngestOptions::from(config.ingest.clone());
            if let Some(batch_size) = batch_size {
                options = options.with_batch_size(batch_size);
            }

            let result = ingest_fundamentals(&store, &provider, &options).await?;
            for error in &result.errors {
                tracing::warn!(error = %error, "수집 진단");
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "message": format!("Loaded fundamentals for {} stocks", result.inserted_count),
                    "count": result.inserted_count,
                    "errors": result.reported_errors(),
                    "sample_data": result.sample,
                }))?
            );
        }
        Commands::Dashboard { limit } => {
            let rows = list_dashboard_rows(&store, limit).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    store.close().await;
    tracing::info!("Stock screener collector 종료");

    Ok(())
}
