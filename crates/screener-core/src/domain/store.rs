//! 저장소 trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::dashboard::DashboardJoinRow;
use super::fundamentals::FundamentalsRecord;
use super::score::DailyScoreRecord;
use super::symbol::TrackedSymbol;
use crate::error::StorageResult;

/// 재무 지표 목록 조회 필터.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundamentalsFilter {
    /// 정확히 일치하는 심볼
    pub symbol: Option<String>,
    /// 정확히 일치하는 섹터
    pub sector: Option<String>,
}

/// 수집기와 대시보드가 공유하는 저장소.
///
/// 두 컴포넌트는 직접 상호작용하지 않으며 이 저장소가 유일한 연결 지점입니다.
#[async_trait]
pub trait ScreenerStore: Send + Sync {
    /// 추적 종목을 심볼 순으로 최대 `limit`개 조회합니다.
    async fn list_tracked_symbols(&self, limit: usize) -> StorageResult<Vec<TrackedSymbol>>;

    /// 추적 종목을 upsert합니다 (심볼 기준).
    async fn upsert_tracked_symbols(&self, symbols: &[TrackedSymbol]) -> StorageResult<usize>;

    /// 재무 지표를 한 배치로 upsert합니다 (심볼 기준 전체 행 교체).
    async fn upsert_fundamentals(&self, records: &[FundamentalsRecord]) -> StorageResult<usize>;

    /// 재무 지표를 시가총액 내림차순으로 조회합니다.
    async fn list_fundamentals(
        &self,
        filter: &FundamentalsFilter,
    ) -> StorageResult<Vec<FundamentalsRecord>>;

    /// 특정 일자의 점수를 조회합니다.
    async fn get_daily_score(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> StorageResult<Option<DailyScoreRecord>>;

    /// 추적 종목 `limit`개에 대해 점수/재무 지표를 조인한 행을 조회합니다.
    ///
    /// 조인 결과는 종목당 여러 행일 수 있습니다.
    async fn fetch_dashboard_join(&self, limit: usize) -> StorageResult<Vec<DashboardJoinRow>>;

    /// 연결 상태 확인.
    async fn ping(&self) -> StorageResult<()>;
}
