//! 종목 스크리너 데이터 수집기.
//!
//! API 서버와 독립적으로 실행할 수 있는 수집 로직과 CLI를 제공합니다:
//! - 재무 지표 수집 (배치 단위, 전체 실패 시 대체 데이터)
//! - CSV 기반 추적 종목 시드

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use modules::{ingest_fundamentals, IngestOptions, IngestResult};
pub use stats::IngestStats;
