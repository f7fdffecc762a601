//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 Axum의 State extractor를 통해 핸들러에 주입됩니다.
//! 저장소 설정이나 연결이 실패해도 서버는 시작되며, 저장소가 필요한 요청만
//! 설정 에러 메시지와 함께 500으로 응답합니다.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;

use screener_collector::IngestOptions;
use screener_core::{FundamentalsProvider, ScreenerStore};

use crate::error::{ApiError, ApiErrorResponse, ApiResult, STORAGE_HINT};
use crate::jobs::JobsClient;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 종목/재무/점수 저장소 (설정 실패 시 None)
    pub store: Option<Arc<dyn ScreenerStore>>,

    /// 저장소를 만들지 못한 이유
    pub storage_error: Option<String>,

    /// 재무 지표 공급자
    pub provider: Arc<dyn FundamentalsProvider>,

    /// 수집 배치 옵션
    pub ingest: IngestOptions,

    /// 외부 작업 서비스 클라이언트 (JOBS_API_URL 미설정 시 None)
    pub jobs: Option<JobsClient>,

    /// API 버전
    pub version: String,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// 저장소 없이 상태를 생성합니다.
    pub fn new(provider: Arc<dyn FundamentalsProvider>, ingest: IngestOptions) -> Self {
        Self {
            store: None,
            storage_error: None,
            provider,
            ingest,
            jobs: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// 저장소 설정.
    pub fn with_store(mut self, store: Arc<dyn ScreenerStore>) -> Self {
        self.store = Some(store);
        self.storage_error = None;
        self
    }

    /// 저장소 초기화 실패 사유 기록.
    pub fn with_storage_error(mut self, message: impl Into<String>) -> Self {
        self.store = None;
        self.storage_error = Some(message.into());
        self
    }

    /// 작업 서비스 클라이언트 설정.
    pub fn with_jobs(mut self, jobs: JobsClient) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// 저장소를 반환하거나, 없으면 500 에러를 반환합니다.
    pub fn store(&self) -> ApiResult<&Arc<dyn ScreenerStore>> {
        self.store.as_ref().ok_or_else(|| self.missing_store_error())
    }

    fn missing_store_error(&self) -> ApiError {
        let message = self
            .storage_error
            .clone()
            .unwrap_or_else(|| "Storage is not configured".to_string());

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::with_details(message, STORAGE_HINT)),
        )
    }

    /// 저장소 설정 여부.
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 헬퍼.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use screener_core::{FundamentalsSnapshot, ProviderError};
    use screener_data::MemoryStore;

    /// `FAIL`로 시작하는 종목은 실패, 나머지는 고정 지표를 반환하는 공급자.
    pub struct StubProvider;

    #[async_trait]
    impl FundamentalsProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_fundamentals(
            &self,
            symbol: &str,
        ) -> Result<FundamentalsSnapshot, ProviderError> {
            if symbol.starts_with("FAIL") {
                return Err(ProviderError::Status(404));
            }

            Ok(FundamentalsSnapshot {
                company_name: Some(format!("{symbol} Ltd")),
                market_cap: Some(rust_decimal_macros::dec!(1000000)),
                trailing_eps: Some(rust_decimal_macros::dec!(10)),
                current_price: Some(rust_decimal_macros::dec!(100)),
                sector: Some("Technology".to_string()),
                ..Default::default()
            })
        }
    }

    /// 메모리 저장소와 고정 공급자를 사용하는 상태.
    pub fn create_test_state(store: Arc<MemoryStore>) -> AppState {
        AppState::new(Arc::new(StubProvider), IngestOptions::default()).with_store(store)
    }

    /// 저장소 없이 설정 에러만 있는 상태.
    pub fn create_unconfigured_state() -> AppState {
        AppState::new(Arc::new(StubProvider), IngestOptions::default()).with_storage_error(
            "Configuration error: missing environment variable DATABASE_URL",
        )
    }
}
