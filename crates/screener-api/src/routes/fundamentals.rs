//! 재무 지표 수집 트리거와 조회 endpoint.
//!
//! - `POST /api/v1/fundamentals` - 추적 종목 한 배치의 재무 지표 수집
//! - `GET /api/v1/fundamentals?symbol=&sector=` - 저장된 재무 지표 조회

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use screener_collector::ingest_fundamentals;
use screener_core::{FundamentalsFilter, FundamentalsRecord};

use crate::error::{collector_error, storage_error, ApiResult};
use crate::state::AppState;

/// 수집 실행 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct FundamentalsLoadResponse {
    pub message: String,
    /// 저장된 레코드 수 (실제 + 대체)
    pub count: usize,
    /// 실패 사유 (최대 3개)
    pub errors: Vec<String>,
    /// 저장된 레코드 샘플 (최대 2개)
    pub sample_data: Vec<FundamentalsRecord>,
}

/// 재무 지표 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct FundamentalsListResponse {
    pub fundamentals: Vec<FundamentalsRecord>,
    pub total: usize,
}

/// 재무 지표 수집 실행.
///
/// POST /api/v1/fundamentals
pub async fn load_fundamentals(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<FundamentalsLoadResponse>> {
    let store = state.store()?;

    let result = ingest_fundamentals(store.as_ref(), state.provider.as_ref(), &state.ingest)
        .await
        .map_err(collector_error)?;

    info!(
        count = result.inserted_count,
        errors = result.errors.len(),
        fallback = result.used_fallback(),
        "재무 지표 수집 요청 완료"
    );

    Ok(Json(FundamentalsLoadResponse {
        message: format!("Loaded fundamentals for {} stocks", result.inserted_count),
        count: result.inserted_count,
        errors: result.reported_errors().to_vec(),
        sample_data: result.sample,
    }))
}

/// 저장된 재무 지표 조회.
///
/// GET /api/v1/fundamentals
pub async fn list_fundamentals(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FundamentalsFilter>,
) -> ApiResult<Json<FundamentalsListResponse>> {
    let store = state.store()?;
    let fundamentals = store
        .list_fundamentals(&filter)
        .await
        .map_err(storage_error)?;

    Ok(Json(FundamentalsListResponse {
        total: fundamentals.len(),
        fundamentals,
    }))
}

/// 재무 지표 라우터 생성.
pub fn fundamentals_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_fundamentals).post(load_fundamentals))
}
