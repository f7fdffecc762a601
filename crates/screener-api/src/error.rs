//! API 에러 응답 타입.
//!
//! 모든 엔드포인트는 실패 시 같은 형식을 사용합니다.
//!
//! ```json
//! {
//!   "error": "Storage connection failed: connection refused",
//!   "details": "Check environment variables and database connection"
//! }
//! ```

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use screener_collector::CollectorError;
use screener_core::StorageError;

/// 저장소 관련 실패에 붙는 안내 문구.
pub const STORAGE_HINT: &str = "Check environment variables and database connection";

/// API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 메시지
    pub error: String,
    /// 추가 안내 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorResponse {
    /// 메시지만 있는 에러.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// 안내 문구를 포함한 에러.
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 에러 타입.
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// 상태 코드와 메시지로 에러를 만듭니다.
pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ApiErrorResponse::new(error)))
}

/// 저장소 에러 → 500.
pub fn storage_error(err: StorageError) -> ApiError {
    tracing::error!(error = %err, "저장소 요청 실패");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::with_details(err.to_string(), STORAGE_HINT)),
    )
}

/// 수집기 에러 → 400 (입력 오류) 또는 500.
pub fn collector_error(err: CollectorError) -> ApiError {
    match err {
        CollectorError::InvalidInput(msg) => api_error(StatusCode::BAD_REQUEST, msg),
        CollectorError::Storage(e) => storage_error(e),
        CollectorError::Config(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::with_details(e.to_string(), STORAGE_HINT)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::ConfigError;

    #[test]
    fn test_json_without_details() {
        let json = serde_json::to_string(&ApiErrorResponse::new("Score not found")).unwrap();
        assert_eq!(json, r#"{"error":"Score not found"}"#);
    }

    #[test]
    fn test_storage_error_carries_hint() {
        let (status, Json(body)) =
            storage_error(StorageError::Connection("connection refused".to_string()));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.details.as_deref(), Some(STORAGE_HINT));
        assert!(body.error.contains("connection refused"));
    }

    #[test]
    fn test_collector_error_mapping() {
        let (status, _) = collector_error(CollectorError::InvalidInput("bad".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, Json(body)) =
            collector_error(CollectorError::Config(ConfigError::MissingVar("DATABASE_URL")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.error.starts_with("Configuration error"));
    }
}
