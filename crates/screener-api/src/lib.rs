//! 종목 스크리너 REST API.
//!
//! - 헬스 체크 (`/health`, `/health/storage`)
//! - 재무 지표 수집 트리거 및 조회 (`/api/v1/fundamentals`)
//! - 대시보드 (`/api/v1/dashboard`)
//! - 일별 점수 조회 (`/api/v1/scores/{symbol}`)
//! - 추적 종목 업로드 (`/api/v1/symbols/upload`)
//! - 외부 작업 트리거 (`/api/v1/jobs/*`)

pub mod error;
pub mod jobs;
pub mod routes;
pub mod state;

pub use routes::create_api_router;
pub use state::AppState;
