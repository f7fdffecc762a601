//! CSV 기반 추적 종목 시드.
//!
//! ## CSV 파일 형식
//!
//! ```csv
//! Symbol,Exchange
//! TCS,NSE
//! RELIANCE,
//! ```
//!
//! `Symbol` 컬럼은 필수이며 `Exchange`가 없거나 비어 있으면 기본 거래소를 사용합니다.

use thiserror::Error;
use tracing::info;

use screener_core::{ScreenerStore, TrackedSymbol};

use crate::error::CollectorError;
use crate::Result;

/// CSV 파싱 에러.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CsvSeedError {
    /// 빈 파일
    #[error("CSV is empty")]
    Empty,
    /// Symbol 헤더 없음
    #[error("CSV must have 'Symbol' column")]
    MissingSymbolColumn,
    /// CSV 형식 오류
    #[error("malformed CSV: {0}")]
    Malformed(String),
}

/// CSV 시드 결과.
#[derive(Debug, Clone, Default)]
pub struct CsvSeedResult {
    /// 처리된 데이터 행 수
    pub total_processed: usize,
    /// upsert된 종목 수
    pub upserted: usize,
    /// 스킵된 행 수 (빈 심볼, 중복)
    pub skipped: usize,
}

/// CSV 내용을 추적 종목 목록으로 파싱합니다.
///
/// 헤더 이름은 대소문자를 구분하지 않습니다. 같은 심볼이 여러 번 나오면
/// 처음 행만 사용합니다.
pub fn parse_symbols_csv(
    content: &str,
    default_exchange: &str,
) -> std::result::Result<(Vec<TrackedSymbol>, usize), CsvSeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvSeedError::Malformed(e.to_string()))?
        .clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvSeedError::Empty);
    }

    let find = |name: &str| headers.iter().position(|c| c.eq_ignore_ascii_case(name));
    let symbol_idx = find("symbol").ok_or(CsvSeedError::MissingSymbolColumn)?;
    let exchange_idx = find("exchange");

    let mut symbols: Vec<TrackedSymbol> = Vec::new();
    let mut skipped = 0;

    for record in reader.records() {
        let record = record.map_err(|e| CsvSeedError::Malformed(e.to_string()))?;
        let symbol = record
            .get(symbol_idx)
            .map(|s| s.to_uppercase())
            .unwrap_or_default();

        if symbol.is_empty() || symbols.iter().any(|s| s.symbol == symbol) {
            skipped += 1;
            continue;
        }

        let exchange = exchange_idx
            .and_then(|idx| record.get(idx))
            .filter(|e| !e.is_empty())
            .unwrap_or(default_exchange);

        symbols.push(TrackedSymbol::new(symbol, exchange));
    }

    Ok((symbols, skipped))
}

/// CSV 내용을 파싱해 추적 종목을 upsert합니다.
///
/// CSV 형식 오류는 [`CollectorError::InvalidInput`]으로 반환됩니다.
pub async fn seed_symbols_from_csv(
    store: &dyn ScreenerStore,
    content: &str,
    default_exchange: &str,
) -> Result<CsvSeedResult> {
    let (symbols, skipped) = parse_symbols_csv(content, default_exchange)
        .map_err(|e| CollectorError::InvalidInput(e.to_string()))?;

    let upserted = if symbols.is_empty() {
        0
    } else {
        store.upsert_tracked_symbols(&symbols).await?
    };

    let result = CsvSeedResult {
        total_processed: symbols.len() + skipped,
        upserted,
        skipped,
    };
    info!(
        upserted = result.upserted,
        skipped = result.skipped,
        "추적 종목 시드 완료"
    );

    Ok(result)
}
