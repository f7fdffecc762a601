//! 에러 타입 정의.

use screener_core::{ConfigError, StorageError};
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러 (시작 시점)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 저장소 에러 (실행 전체 실패)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// 잘못된 입력
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
