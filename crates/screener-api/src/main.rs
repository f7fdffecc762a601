//! 종목 스크리너 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use screener_api::jobs::JobsClient;
use screener_api::{create_api_router, AppState};
use screener_collector::IngestOptions;
use screener_core::{
    env_var_parse, init_logging, IngestConfig, LogConfig, ProviderConfig, StorageConfig,
};
use screener_data::{PgScreenerStore, YahooFundamentalsClient};

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
    /// 전역 요청 타임아웃
    request_timeout: Duration,
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_var_parse("API_PORT", 3000),
            request_timeout: Duration::from_secs(env_var_parse("REQUEST_TIMEOUT_SECS", 30)),
        }
    }

    /// 소켓 주소 반환.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// AppState 생성.
///
/// 저장소 풀은 지연 연결로 만들어 데이터베이스가 늦게 떠도 재시작 없이 복구됩니다.
/// 설정이 없거나 잘못된 경우에만 에러를 기록한 상태로 시작합니다.
fn create_app_state() -> Result<(AppState, Option<PgScreenerStore>), Box<dyn std::error::Error>> {
    let provider = YahooFundamentalsClient::new(&ProviderConfig::from_env())?;
    let ingest = IngestOptions::from(IngestConfig::from_env()?);
    let mut state = AppState::new(Arc::new(provider), ingest);

    let store = match StorageConfig::from_env()
        .map_err(|e| e.to_string())
        .and_then(|config| PgScreenerStore::connect_lazy(&config).map_err(|e| e.to_string()))
    {
        Ok(store) => {
            state = state.with_store(Arc::new(store.clone()));
            Some(store)
        }
        Err(message) => {
            warn!(error = %message, "저장소 설정 오류, 저장소 없이 시작합니다");
            state = state.with_storage_error(message);
            None
        }
    };

    match JobsClient::from_env() {
        Some(Ok(jobs)) => state = state.with_jobs(jobs),
        Some(Err(e)) => warn!(error = %e, "작업 서비스 클라이언트 생성 실패"),
        None => info!("JOBS_API_URL not set, job triggers disabled"),
    }

    Ok((state, store))
}

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 설정되면 해당 origin만 허용하고,
/// 없으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let origins_env = std::env::var("CORS_ORIGINS").ok().filter(|v| !v.is_empty());

    let allow_origin = match &origins_env {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    init_logging(LogConfig::from_env(
        "screener_api=info,screener_collector=info,screener_data=info,tower_http=debug",
    ))?;

    info!("Starting stock screener API server...");

    let config = ServerConfig::from_env();
    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    let (state, store) = create_app_state()?;
    let state = Arc::new(state);
    info!(
        version = %state.version,
        has_store = state.has_store(),
        has_jobs = state.jobs.is_some(),
        batch_size = state.ingest.batch_size,
        "Application state initialized"
    );

    let app = create_router(state, config.request_timeout);

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    if let Some(store) = store {
        store.close().await;
        info!("Database pool closed");
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
