//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/storage` - 저장소 연결 진단
//! - `/api/v1/fundamentals` - 재무 지표 수집/조회
//! - `/api/v1/dashboard` - 종목별 최신 점수 + 재무 지표
//! - `/api/v1/scores` - 일별 점수 조회
//! - `/api/v1/symbols` - 추적 종목 CSV 업로드
//! - `/api/v1/jobs` - 외부 작업 트리거 (백필, 스캐너)

pub mod dashboard;
pub mod fundamentals;
pub mod health;
pub mod jobs;
pub mod scores;
pub mod symbols;

pub use dashboard::dashboard_router;
pub use fundamentals::{fundamentals_router, FundamentalsListResponse, FundamentalsLoadResponse};
pub use health::{health_router, HealthResponse, StorageHealthResponse};
pub use jobs::jobs_router;
pub use scores::scores_router;
pub use symbols::{symbols_router, UploadResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/fundamentals", fundamentals_router())
        .nest("/api/v1/dashboard", dashboard_router())
        .nest("/api/v1/scores", scores_router())
        .nest("/api/v1/symbols", symbols_router())
        .nest("/api/v1/jobs", jobs_router())
}
