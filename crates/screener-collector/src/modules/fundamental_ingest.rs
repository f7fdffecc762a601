//! 재무 지표 배치 수집.
//!
//! 1. 추적 종목을 최대 `batch_size`개 선택 (심볼 순)
//! 2. 종목별 독립 조회 (동시 실행 수 제한, 종목별 타임아웃)
//! 3. 성공 응답 정규화, 실패는 진단 문자열로 기록
//! 4. 성공이 하나도 없으면 최대 3개 종목의 대체 레코드 생성
//! 5. 모든 조회가 끝난 뒤 한 번만 upsert
//!
//! 일부 종목만 실패한 경우에는 대체 데이터를 만들지 않습니다.

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use screener_core::{
    FundamentalsProvider, FundamentalsRecord, FundamentalsSnapshot, IngestConfig, ProviderError,
    ScreenerStore,
};

use super::synthetic::{generate_fallback_records, FALLBACK_NOTE};
use crate::error::CollectorError;
use crate::stats::IngestStats;
use crate::Result;

/// 외부 응답에 포함되는 에러 개수.
pub const REPORTED_ERROR_LIMIT: usize = 3;

/// 외부 응답에 포함되는 샘플 레코드 개수.
pub const SAMPLE_LIMIT: usize = 2;

/// 수집 실행 옵션.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// 선택할 종목 수 (양수)
    pub batch_size: usize,
    /// 동시 조회 수
    pub concurrency: usize,
    /// 종목별 조회 타임아웃
    pub fetch_timeout: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestConfig::default().into()
    }
}

impl From<IngestConfig> for IngestOptions {
    fn from(config: IngestConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            concurrency: config.concurrency,
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

impl IngestOptions {
    /// 배치 크기만 바꾼 옵션.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// 수집 결과.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// upsert된 레코드 수 (실제 + 대체)
    pub inserted_count: usize,
    /// 전체 진단 목록 (종목별 실패 + 대체 데이터 안내)
    pub errors: Vec<String>,
    /// 생성된 레코드 중 앞 2개
    pub sample: Vec<FundamentalsRecord>,
    /// 실행 통계
    pub stats: IngestStats,
}

impl IngestResult {
    /// 외부 보고용 에러 목록 (앞 3개).
    pub fn reported_errors(&self) -> &[String] {
        &self.errors[..self.errors.len().min(REPORTED_ERROR_LIMIT)]
    }

    /// 대체 데이터가 사용되었는지 여부.
    pub fn used_fallback(&self) -> bool {
        self.stats.synthetic > 0
    }
}

/// 재무 지표를 한 배치 수집합니다.
///
/// 종목별 조회 실패는 결과의 `errors`에 기록되고 실행을 중단하지 않습니다.
/// 종목 선택이나 upsert가 실패하면 실행 전체가 실패하며, upsert는 마지막에
/// 한 번만 수행되므로 부분 반영은 없습니다.
pub async fn ingest_fundamentals(
    store: &dyn ScreenerStore,
    provider: &dyn FundamentalsProvider,
    options: &IngestOptions,
) -> Result<IngestResult> {
    if options.batch_size == 0 {
        return Err(CollectorError::InvalidInput(
            "batch_size must be a positive integer".to_string(),
        ));
    }

    let started = Instant::now();
    let symbols = store.list_tracked_symbols(options.batch_size).await?;

    info!(
        batch_size = options.batch_size,
        selected = symbols.len(),
        provider = provider.name(),
        "재무 지표 수집 시작"
    );

    let fetch_timeout = options.fetch_timeout;
    let symbol_names: Vec<String> = symbols.iter().map(|s| s.symbol.clone()).collect();
    // 각 태스크는 자기 결과만 반환하고, collect가 끝나는 지점이 유일한 합류 지점
    let outcomes: Vec<(String, std::result::Result<FundamentalsSnapshot, ProviderError>)> =
        stream::iter(symbol_names)
            .map(|symbol| async move {
                let outcome =
                    match tokio::time::timeout(fetch_timeout, provider.fetch_fundamentals(&symbol))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::Timeout(fetch_timeout.as_secs())),
                    };
                (symbol, outcome)
            })
            .buffered(options.concurrency.max(1))
            .collect()
            .await;

    let mut stats = IngestStats {
        total: symbols.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();

    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(snapshot) => records.push(snapshot.normalize(&symbol)),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "재무 지표 조회 실패");
                errors.push(format!("{}: {}", symbol, e));
            }
        }
    }
    stats.success = records.len();
    stats.errors = errors.len();

    if records.is_empty() && !symbols.is_empty() {
        records = generate_fallback_records(&symbols);
        stats.synthetic = records.len();
        errors.push(FALLBACK_NOTE.to_string());
        warn!(
            failed = stats.errors,
            synthetic = stats.synthetic,
            "모든 조회 실패, 대체 데이터 사용"
        );
    }

    if !records.is_empty() {
        stats.upserted = store.upsert_fundamentals(&records).await?;
    }

    stats.elapsed = started.elapsed();
    stats.log_summary("재무 지표 수집");

    Ok(IngestResult {
        inserted_count: stats.upserted,
        errors,
        sample: records.into_iter().take(SAMPLE_LIMIT).collect(),
        stats,
    })
}
