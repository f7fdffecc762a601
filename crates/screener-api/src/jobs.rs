//! 외부 작업 서비스 트리거 클라이언트.
//!
//! 과거 시세 백필과 인사이트 스캐너는 별도 서비스에서 실행됩니다.
//! 이 클라이언트는 본문 없이 POST 요청만 보내고 `{message}` 응답을 전달합니다.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// 트리거할 작업 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// 과거 시세 백필
    Backfill,
    /// 인사이트 스캐너
    Scanner,
}

impl JobKind {
    /// 작업 서비스의 엔드포인트 경로.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Backfill => "/api/trigger_backfill",
            Self::Scanner => "/api/run_scanner",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backfill => write!(f, "backfill"),
            Self::Scanner => write!(f, "scanner"),
        }
    }
}

/// 작업 서비스 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMessage {
    pub message: String,
}

/// 작업 트리거 에러.
#[derive(Debug, Error)]
pub enum JobsError {
    /// 요청 전송 실패
    #[error("job service request failed: {0}")]
    Request(String),
    /// 작업 서비스가 실패 응답
    #[error("job service returned {status}: {detail}")]
    Upstream { status: u16, detail: String },
    /// 응답 파싱 실패
    #[error("job service returned an unexpected body: {0}")]
    Parse(String),
}

/// 작업 서비스 클라이언트.
#[derive(Debug, Clone)]
pub struct JobsClient {
    client: reqwest::Client,
    base_url: String,
}

impl JobsClient {
    /// 클라이언트를 생성합니다.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, JobsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JobsError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `JOBS_API_URL`이 설정되어 있으면 클라이언트를 생성합니다.
    pub fn from_env() -> Option<Result<Self, JobsError>> {
        let base_url = std::env::var("JOBS_API_URL").ok().filter(|v| !v.is_empty())?;
        let timeout_secs = screener_core::env_var_parse("JOBS_TIMEOUT_SECS", 25);

        Some(Self::new(base_url, Duration::from_secs(timeout_secs)))
    }

    /// 작업을 트리거합니다. `symbol`이 없으면 전체 추적 종목 대상입니다.
    pub async fn trigger(&self, kind: JobKind, symbol: Option<&str>) -> Result<JobMessage, JobsError> {
        let url = format!("{}{}", self.base_url, kind.path());
        let mut request = self.client.post(&url);
        if let Some(symbol) = symbol {
            request = request.query(&[("symbol", symbol)]);
        }

        info!(job = %kind, symbol = ?symbol, "작업 트리거 요청");

        let response = request
            .send()
            .await
            .map_err(|e| JobsError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JobsError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(JobsError::Upstream {
                status: status.as_u16(),
                detail: upstream_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| JobsError::Parse(e.to_string()))
    }
}

/// 작업 서비스의 `{"detail": ...}` 에러 본문에서 메시지를 꺼냅니다.
fn upstream_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<Detail>(body) {
        Ok(Detail {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(Detail { detail }) => detail.to_string(),
        Err(_) => body.chars().take(200).collect(),
    }
}
