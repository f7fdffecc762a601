//! 대시보드 endpoint.
//!
//! 종목마다 한 행씩, 가장 최근 점수와 재무 지표를 결합해 반환합니다.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use screener_core::DashboardRow;
use screener_data::list_dashboard_rows;

use crate::error::{api_error, storage_error, ApiResult};
use crate::state::AppState;

/// 기본 조회 종목 수.
pub const DEFAULT_DASHBOARD_LIMIT: i64 = 100;

/// 대시보드 쿼리.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub limit: Option<i64>,
}

/// 대시보드 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub rows: Vec<DashboardRow>,
    pub total: usize,
}

/// 대시보드 행 조회.
///
/// GET /api/v1/dashboard?limit=N
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_DASHBOARD_LIMIT);
    let limit = usize::try_from(limit)
        .ok()
        .filter(|&l| l > 0)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "limit must be a positive integer"))?;

    let store = state.store()?;
    let rows = list_dashboard_rows(store.as_ref(), limit)
        .await
        .map_err(storage_error)?;

    Ok(Json(DashboardResponse {
        total: rows.len(),
        rows,
    }))
}

/// 대시보드 라우터 생성.
pub fn dashboard_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::create_test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use screener_data::MemoryStore;
    use tower::ServiceExt;

    async fn get_json(store: Arc<MemoryStore>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new()
            .nest("/api/v1/dashboard", dashboard_router())
            .with_state(Arc::new(create_test_state(store)));

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_one_row_per_symbol_with_latest_score() {
        let store = Arc::new(MemoryStore::with_symbols(["INFY", "TCS"]));
        store.insert_score("INFY", date(1), dec!(0.4)).await;
        store.insert_score("INFY", date(3), dec!(0.9)).await;
        store.insert_score("INFY", date(2), dec!(0.6)).await;

        let (status, json) = get_json(store, "/api/v1/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 2);
        let infy = json["rows"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["symbol"] == "INFY")
            .unwrap();
        assert_eq!(infy["combined_score"], 0.9);
        assert_eq!(infy["score_date"], "2024-03-03");
    }

    #[tokio::test]
    async fn test_dashboard_respects_limit() {
        let store = Arc::new(MemoryStore::with_symbols(["A", "B", "C"]));
        let (_, json) = get_json(store, "/api/v1/dashboard?limit=2").await;
        assert_eq!(json["total"], 2);
    }

    #[tokio::test]
    async fn test_dashboard_rejects_non_positive_limit() {
        let store = Arc::new(MemoryStore::with_symbols(["A"]));

        let (status, _) = get_json(store.clone(), "/api/v1/dashboard?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(store, "/api/v1/dashboard?limit=-5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
