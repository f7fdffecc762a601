//! 환경변수 기반 설정 모듈.

use screener_core::{IngestConfig, ProviderConfig, StorageConfig};

use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 저장소 설정
    pub storage: StorageConfig,
    /// 재무 데이터 공급자 설정
    pub provider: ProviderConfig,
    /// 재무 지표 수집 설정
    pub ingest: IngestConfig,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            storage: StorageConfig::from_env()?,
            provider: ProviderConfig::from_env(),
            ingest: IngestConfig::from_env()?,
        })
    }
}
