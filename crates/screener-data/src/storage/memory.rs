//! 메모리 저장소.
//!
//! Postgres 저장소와 같은 의미(심볼 기준 upsert, FK 검사, 심볼 순 선택)를
//! 흉내 내며 테스트와 로컬 실행에 사용합니다. 점수는 삽입 순서 그대로
//! 조인되므로 대시보드 병합 단계의 정렬을 검증할 수 있습니다.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use screener_core::{
    DailyScoreRecord, DashboardJoinRow, FundamentalsFilter, FundamentalsRecord, ScreenerStore,
    StorageError, StorageResult, TrackedSymbol,
};

#[derive(Debug, Default)]
struct Tables {
    symbols: BTreeMap<String, TrackedSymbol>,
    fundamentals: BTreeMap<String, FundamentalsRecord>,
    scores: Vec<DailyScoreRecord>,
}

/// 메모리 기반 [`ScreenerStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing: AtomicBool,
    fundamentals_upserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 추적 종목이 채워진 저장소.
    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables = Tables::default();
        for symbol in symbols {
            let tracked = TrackedSymbol::new(symbol, screener_core::DEFAULT_EXCHANGE);
            tables.symbols.insert(tracked.symbol.clone(), tracked);
        }

        Self {
            tables: RwLock::new(tables),
            ..Default::default()
        }
    }

    /// 일별 점수 행을 추가합니다 (외부 스캐너 역할).
    pub async fn insert_score(&self, symbol: &str, date: NaiveDate, score: rust_decimal::Decimal) {
        self.tables.write().await.scores.push(DailyScoreRecord {
            symbol: symbol.to_string(),
            date,
            combined_score: score,
        });
    }

    /// 이후 모든 쿼리를 실패시킵니다.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `upsert_fundamentals` 호출 횟수.
    pub fn fundamentals_upsert_calls(&self) -> usize {
        self.fundamentals_upserts.load(Ordering::SeqCst)
    }

    /// 저장된 재무 지표 (심볼 순).
    pub async fn stored_fundamentals(&self) -> Vec<FundamentalsRecord> {
        self.tables.read().await.fundamentals.values().cloned().collect()
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ScreenerStore for MemoryStore {
    async fn list_tracked_symbols(&self, limit: usize) -> StorageResult<Vec<TrackedSymbol>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.symbols.values().take(limit).cloned().collect())
    }

    async fn upsert_tracked_symbols(&self, symbols: &[TrackedSymbol]) -> StorageResult<usize> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        for symbol in symbols {
            tables.symbols.insert(symbol.symbol.clone(), symbol.clone());
        }
        Ok(symbols.len())
    }

    async fn upsert_fundamentals(&self, records: &[FundamentalsRecord]) -> StorageResult<usize> {
        self.check_available()?;
        self.fundamentals_upserts.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.tables.write().await;
        // 트랜잭션처럼 전부 검사한 뒤 반영
        if let Some(unknown) = records
            .iter()
            .find(|r| !tables.symbols.contains_key(&r.symbol))
        {
            return Err(StorageError::Constraint(format!(
                "fundamentals.symbol {} is not a tracked symbol",
                unknown.symbol
            )));
        }
        for record in records {
            tables
                .fundamentals
                .insert(record.symbol.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn list_fundamentals(
        &self,
        filter: &FundamentalsFilter,
    ) -> StorageResult<Vec<FundamentalsRecord>> {
        self.check_available()?;
        let tables = self.tables.read().await;

        let mut records: Vec<FundamentalsRecord> = tables
            .fundamentals
            .values()
            .filter(|r| filter.symbol.as_ref().map_or(true, |s| &r.symbol == s))
            .filter(|r| filter.sector.as_ref().map_or(true, |s| &r.sector == s))
            .cloned()
            .collect();

        // market_cap 내림차순, NULL은 뒤로
        records.sort_by(|a, b| match (a.market_cap, b.market_cap) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(records)
    }

    async fn get_daily_score(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> StorageResult<Option<DailyScoreRecord>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .scores
            .iter()
            .find(|s| s.symbol == symbol && s.date == date)
            .cloned())
    }

    async fn fetch_dashboard_join(&self, limit: usize) -> StorageResult<Vec<DashboardJoinRow>> {
        self.check_available()?;
        let tables = self.tables.read().await;

        let mut rows = Vec::new();
        for tracked in tables.symbols.values().take(limit) {
            let fundamentals = tables.fundamentals.get(&tracked.symbol).cloned();
            let scores: Vec<&DailyScoreRecord> = tables
                .scores
                .iter()
                .filter(|s| s.symbol == tracked.symbol)
                .collect();

            if scores.is_empty() {
                rows.push(DashboardJoinRow {
                    symbol: tracked.symbol.clone(),
                    exchange: tracked.exchange.clone(),
                    score_date: None,
                    combined_score: None,
                    fundamentals,
                });
                continue;
            }

            for score in scores {
                rows.push(DashboardJoinRow {
                    symbol: tracked.symbol.clone(),
                    exchange: tracked.exchange.clone(),
                    score_date: Some(score.date),
                    combined_score: Some(score.combined_score),
                    fundamentals: fundamentals.clone(),
                });
            }
        }
        Ok(rows)
    }

    async fn ping(&self) -> StorageResult<()> {
        self.check_available()
    }
}
