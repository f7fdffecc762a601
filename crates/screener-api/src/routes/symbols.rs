//! 추적 종목 업로드 endpoint.
//!
//! CSV 본문(`Symbol` 필수, `Exchange` 선택)을 받아 추적 종목을 upsert합니다.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use screener_collector::modules::seed_symbols_from_csv;
use screener_core::DEFAULT_EXCHANGE;

use crate::error::{collector_error, ApiResult};
use crate::state::AppState;

/// 업로드 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub count: usize,
}

/// 추적 종목 CSV 업로드.
///
/// POST /api/v1/symbols/upload
pub async fn upload_symbols(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<UploadResponse>> {
    let store = state.store()?;
    let result = seed_symbols_from_csv(store.as_ref(), &body, DEFAULT_EXCHANGE)
        .await
        .map_err(collector_error)?;

    info!(
        upserted = result.upserted,
        skipped = result.skipped,
        "추적 종목 업로드 완료"
    );

    Ok(Json(UploadResponse {
        message: format!("Uploaded {} stocks", result.upserted),
        count: result.upserted,
    }))
}

/// 종목 라우터 생성.
pub fn symbols_router() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload_symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::create_test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use screener_core::ScreenerStore;
    use screener_data::MemoryStore;
    use tower::ServiceExt;

    async fn upload(store: Arc<MemoryStore>, csv: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new()
            .nest("/api/v1/symbols", symbols_router())
            .with_state(Arc::new(create_test_state(store)));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/symbols/upload")
                    .header("content-type", "text/csv")
                    .body(Body::from(csv.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_upload_symbols() {
        let store = Arc::new(MemoryStore::new());
        let (status, json) = upload(store.clone(), "Symbol,Exchange\nINFY,NSE\nTCS,BSE\n").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Uploaded 2 stocks");
        assert_eq!(json["count"], 2);

        let symbols = store.list_tracked_symbols(10).await.unwrap();
        assert_eq!(symbols.len(), 2);
        assert!(symbols.iter().any(|s| s.symbol == "TCS" && s.exchange == "BSE"));
    }

    #[tokio::test]
    async fn test_upload_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        upload(store.clone(), "Symbol\nINFY\n").await;
        upload(store.clone(), "Symbol\nINFY\n").await;

        assert_eq!(store.list_tracked_symbols(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_symbol_column() {
        let store = Arc::new(MemoryStore::new());
        let (status, json) = upload(store, "Ticker\nINFY\n").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "CSV must have 'Symbol' column");
    }
}
