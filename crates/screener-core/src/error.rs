//! 스크리너 에러 분류.
//!
//! - [`ConfigError`]: 시작 시점의 설정 누락/오류 (치명적)
//! - [`ProviderError`]: 종목 단위 재무 데이터 조회 실패 (복구됨, 진단 문자열로 기록)
//! - [`StorageError`]: 저장소 조회/upsert 실패 (치명적)

use thiserror::Error;

/// 설정 에러.
///
/// 저장소 에러와 구분되도록 항상 "Configuration error"로 시작합니다.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 필수 환경변수 누락
    #[error("Configuration error: {0} 환경변수가 설정되지 않았습니다")]
    MissingVar(&'static str),

    /// 환경변수 값이 유효하지 않음
    #[error("Configuration error: {key} 값이 유효하지 않습니다 ({value})")]
    InvalidVar {
        /// 환경변수 이름
        key: &'static str,
        /// 입력된 값
        value: String,
    },
}

/// 재무 데이터 공급자 에러 (종목 단위).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// 네트워크/전송 실패
    #[error("request failed: {0}")]
    Network(String),

    /// 2xx가 아닌 응답
    #[error("API returned status {0}")]
    Status(u16),

    /// 응답 본문 파싱 실패
    #[error("malformed payload: {0}")]
    Parse(String),

    /// result 블록 없음
    #[error("no data returned{}", .0.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    MissingResult(Option<String>),

    /// 조회 시간 초과
    #[error("timed out after {0}s")]
    Timeout(u64),
}

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StorageError {
    /// 연결/인증 실패
    #[error("Storage connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("Storage query failed: {0}")]
    Query(String),

    /// 제약 조건 위반
    #[error("Storage constraint violation: {0}")]
    Constraint(String),
}

/// 저장소 작업 Result 타입.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.constraint().is_some() => {
                Self::Constraint(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Connection(err.to_string()),
            _ => Self::Query(err.to_string()),
        }
    }
}
