//! 외부 작업 트리거 endpoint.
//!
//! - `POST /api/v1/jobs/backfill[?symbol=]` - 과거 시세 백필
//! - `POST /api/v1/jobs/scanner[?symbol=]` - 인사이트 스캐너
//!
//! 작업 서비스가 설정되지 않으면 503, 작업 서비스 실패는 502로 응답합니다.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::error::{api_error, ApiErrorResponse, ApiResult};
use crate::jobs::{JobKind, JobMessage};
use crate::state::AppState;

/// 작업 대상 종목 (없으면 전체).
#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub symbol: Option<String>,
}

async fn trigger_job(
    state: &AppState,
    kind: JobKind,
    query: JobQuery,
) -> ApiResult<Json<JobMessage>> {
    let jobs = state.jobs.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Job service is not configured (JOBS_API_URL)",
        )
    })?;

    let symbol = query
        .symbol
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());

    jobs.trigger(kind, symbol.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            warn!(job = %kind, error = %e, "작업 트리거 실패");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiErrorResponse::with_details(
                    format!("Failed to trigger {kind}"),
                    e.to_string(),
                )),
            )
        })
}

/// 과거 시세 백필 트리거.
///
/// POST /api/v1/jobs/backfill
pub async fn trigger_backfill(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobQuery>,
) -> ApiResult<Json<JobMessage>> {
    trigger_job(&state, JobKind::Backfill, query).await
}

/// 인사이트 스캐너 트리거.
///
/// POST /api/v1/jobs/scanner
pub async fn trigger_scanner(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobQuery>,
) -> ApiResult<Json<JobMessage>> {
    trigger_job(&state, JobKind::Scanner, query).await
}

/// 작업 라우터 생성.
pub fn jobs_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/backfill", post(trigger_backfill))
        .route("/scanner", post(trigger_scanner))
}
