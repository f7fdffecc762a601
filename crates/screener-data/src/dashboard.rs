//! 대시보드 집계.

use std::time::Instant;

use tracing::debug;

use screener_core::{collapse_dashboard_rows, DashboardRow, ScreenerStore, StorageResult};

/// 추적 종목 `limit`개에 대한 대시보드 행을 조회합니다.
///
/// 조회 실패는 부분 결과 없이 그대로 반환됩니다.
pub async fn list_dashboard_rows(
    store: &dyn ScreenerStore,
    limit: usize,
) -> StorageResult<Vec<DashboardRow>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let started = Instant::now();
    let joined = store.fetch_dashboard_join(limit).await?;
    let joined_count = joined.len();
    let rows = collapse_dashboard_rows(joined);

    debug!(
        limit,
        joined = joined_count,
        rows = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "대시보드 행 병합 완료"
    );

    Ok(rows)
}
