//! 일별 점수 조회 endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use screener_core::DailyScoreRecord;

use crate::error::{api_error, storage_error, ApiResult};
use crate::state::AppState;

/// 점수 조회 쿼리. `date`가 없으면 오늘(UTC)입니다.
#[derive(Debug, Deserialize)]
pub struct ScoreQuery {
    pub date: Option<NaiveDate>,
}

/// 종목의 특정 날짜 점수 조회.
///
/// GET /api/v1/scores/{symbol}?date=YYYY-MM-DD
pub async fn get_score(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> ApiResult<Json<DailyScoreRecord>> {
    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let symbol = symbol.trim().to_uppercase();

    let store = state.store()?;
    store
        .get_daily_score(&symbol, date)
        .await
        .map_err(storage_error)?
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Score not found"))
}

/// 점수 라우터 생성.
pub fn scores_router() -> Router<Arc<AppState>> {
    Router::new().route("/{symbol}", get(get_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::create_test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rust_decimal_macros::dec;
    use screener_data::MemoryStore;
    use tower::ServiceExt;

    async fn get_json(store: Arc<MemoryStore>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new()
            .nest("/api/v1/scores", scores_router())
            .with_state(Arc::new(create_test_state(store)));

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_get_score_for_date() {
        let store = Arc::new(MemoryStore::with_symbols(["INFY"]));
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        store.insert_score("INFY", date, dec!(0.75)).await;

        let (status, json) = get_json(store, "/api/v1/scores/INFY?date=2024-03-01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["symbol"], "INFY");
        assert_eq!(json["combined_score"], 0.75);
    }

    #[tokio::test]
    async fn test_get_score_defaults_to_today() {
        let store = Arc::new(MemoryStore::with_symbols(["INFY"]));
        let today = chrono::Utc::now().date_naive();
        store.insert_score("INFY", today, dec!(0.5)).await;

        let (status, _) = get_json(store, "/api/v1/scores/infy").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_score_not_found() {
        let store = Arc::new(MemoryStore::with_symbols(["INFY"]));
        let (status, json) = get_json(store, "/api/v1/scores/INFY?date=2020-01-01").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Score not found");
    }
}
