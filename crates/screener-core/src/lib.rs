//! # Screener Core
//!
//! 종목 스크리너의 핵심 도메인 모델과 협력자 trait을 제공합니다.
//!
//! - 추적 종목, 재무 지표, 일별 점수 레코드
//! - 대시보드 행 병합 (collapse)
//! - 재무 데이터 공급자 / 저장소 trait
//! - 에러 분류, 환경변수 설정, 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
