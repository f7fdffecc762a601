//! 재무 데이터 공급자와 저장소 구현.
//!
//! - Yahoo Finance quoteSummary 클라이언트 ([`provider::YahooFundamentalsClient`])
//! - Postgres 저장소 ([`storage::PgScreenerStore`])
//! - 메모리 저장소 ([`storage::MemoryStore`], 테스트/로컬 실행용)
//! - 대시보드 집계 ([`dashboard::list_dashboard_rows`])

pub mod dashboard;
pub mod provider;
pub mod storage;

pub use dashboard::list_dashboard_rows;
pub use provider::YahooFundamentalsClient;
pub use storage::{MemoryStore, PgScreenerStore};
