//! 헬스 체크 endpoint.
//!
//! `GET /health`는 프로세스 생존만 확인하고, `GET /health/storage`는
//! 저장소 연결과 필수 환경 변수 존재 여부를 진단합니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use screener_core::{StorageConfig, TrackedSymbol};

use crate::state::AppState;

/// 진단 응답에 포함할 샘플 종목 수.
const SAMPLE_STOCKS: usize = 3;

/// 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 항상 "ok"
    pub status: String,
    pub message: String,
    /// API 버전
    pub version: String,
    /// 서버 업타임(초)
    pub uptime_secs: i64,
    /// 현재 시간 (RFC 3339)
    pub timestamp: String,
}

/// 필수 저장소 환경 변수 존재 여부.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvCheck {
    pub has_url: bool,
    pub has_key: bool,
}

/// 저장소 진단 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct StorageHealthResponse {
    /// "ok" | "error"
    pub status: String,
    pub message: String,
    /// 추적 종목 샘플 (최대 3개)
    pub sample_stocks: Vec<TrackedSymbol>,
    pub env_check: EnvCheck,
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Stock screener API is running".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// 저장소 진단.
///
/// GET /health/storage
pub async fn storage_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (has_url, has_key) = StorageConfig::env_presence();
    let env_check = EnvCheck { has_url, has_key };

    let error_response = |message: String, env_check: EnvCheck| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StorageHealthResponse {
                status: "error".to_string(),
                message,
                sample_stocks: Vec::new(),
                env_check,
            }),
        )
    };

    let store = match state.store() {
        Ok(store) => store,
        Err((_, Json(body))) => return error_response(body.error, env_check),
    };

    if let Err(e) = store.ping().await {
        return error_response(e.to_string(), env_check);
    }

    match store.list_tracked_symbols(SAMPLE_STOCKS).await {
        Ok(sample_stocks) => (
            StatusCode::OK,
            Json(StorageHealthResponse {
                status: "ok".to_string(),
                message: "Storage connection successful".to_string(),
                sample_stocks,
                env_check,
            }),
        ),
        Err(e) => error_response(e.to_string(), env_check),
    }
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/storage", get(storage_health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{create_test_state, create_unconfigured_state};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use screener_data::MemoryStore;
    use tower::ServiceExt;

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(Arc::new(state));

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let state = create_test_state(Arc::new(MemoryStore::new()));
        let (status, json) = get_json(state, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_health_check_without_storage() {
        let (status, json) = get_json(create_unconfigured_state(), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_storage_health_samples_three_symbols() {
        let store = Arc::new(MemoryStore::with_symbols(["A", "B", "C", "D", "E"]));
        let (status, json) = get_json(create_test_state(store), "/health/storage").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sample_stocks"].as_array().unwrap().len(), 3);
        assert!(json["env_check"]["has_url"].is_boolean());
    }

    #[tokio::test]
    async fn test_storage_health_reports_unreachable_store() {
        let store = Arc::new(MemoryStore::with_symbols(["A"]));
        store.set_failing(true);
        let (status, json) = get_json(create_test_state(store), "/health/storage").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert!(json["sample_stocks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_health_reports_missing_config() {
        let (status, json) = get_json(create_unconfigured_state(), "/health/storage").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("DATABASE_URL"));
    }
}
