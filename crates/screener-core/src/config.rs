//! 환경변수 기반 설정.
//!
//! 모든 바이너리(수집기, API 서버)가 같은 키를 공유합니다.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// 기본 재무 지표 배치 크기.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// 저장소(Postgres) 설정.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// 연결 URL
    pub database_url: String,
    /// 서비스 자격증명 (연결 비밀번호로 사용)
    pub service_key: SecretString,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl StorageConfig {
    /// 환경변수에서 로드합니다.
    ///
    /// `DATABASE_URL`과 `DATABASE_SERVICE_KEY`는 필수입니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = required_var("DATABASE_URL")?;
        let service_key = SecretString::from(required_var("DATABASE_SERVICE_KEY")?);

        Ok(Self {
            database_url,
            service_key,
            max_connections: env_var_parse("DATABASE_MAX_CONNECTIONS", 10),
            acquire_timeout_secs: env_var_parse("DATABASE_ACQUIRE_TIMEOUT_SECS", 10),
        })
    }

    /// 연결 획득 타임아웃.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// 필수 저장소 변수의 존재 여부 (`has_url`, `has_key`).
    pub fn env_presence() -> (bool, bool) {
        (
            std::env::var("DATABASE_URL").is_ok_and(|v| !v.is_empty()),
            std::env::var("DATABASE_SERVICE_KEY").is_ok_and(|v| !v.is_empty()),
        )
    }
}

/// Yahoo Finance quoteSummary 공급자 설정.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API 기본 URL
    pub base_url: String,
    /// 심볼 접미사 (NSE: ".NS")
    pub symbol_suffix: String,
    /// HTTP 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            symbol_suffix: ".NS".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// 환경변수에서 로드합니다. 누락된 값은 기본값을 사용합니다.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("YAHOO_BASE_URL").unwrap_or(defaults.base_url),
            symbol_suffix: std::env::var("YAHOO_SYMBOL_SUFFIX").unwrap_or(defaults.symbol_suffix),
            timeout_secs: env_var_parse("YAHOO_TIMEOUT_SECS", defaults.timeout_secs),
        }
    }

    /// HTTP 요청 타임아웃.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 재무 지표 수집 설정.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// 한 번의 실행에서 선택할 종목 수
    pub batch_size: usize,
    /// 동시 조회 수
    pub concurrency: usize,
    /// 종목별 조회 타임아웃 (초)
    pub fetch_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: 4,
            fetch_timeout_secs: 10,
        }
    }
}

impl IngestConfig {
    /// 환경변수에서 로드합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            batch_size: env_var_parse("FUNDAMENTAL_BATCH_SIZE", defaults.batch_size),
            concurrency: env_var_parse("FUNDAMENTAL_CONCURRENCY", defaults.concurrency),
            fetch_timeout_secs: env_var_parse(
                "FUNDAMENTAL_FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout_secs,
            ),
        };

        if config.batch_size == 0 {
            return Err(ConfigError::InvalidVar {
                key: "FUNDAMENTAL_BATCH_SIZE",
                value: "0".to_string(),
            });
        }
        if config.concurrency == 0 {
            return Err(ConfigError::InvalidVar {
                key: "FUNDAMENTAL_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    /// 종목별 조회 타임아웃.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn required_var(key: &'static str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(key)),
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
pub fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
