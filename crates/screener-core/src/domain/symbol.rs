//! 추적 종목.

use serde::{Deserialize, Serialize};

/// 거래소가 지정되지 않은 종목의 기본 거래소.
pub const DEFAULT_EXCHANGE: &str = "NSE";

/// 추적 종목 (screened_stocks).
///
/// 시드/업로드 작업이 생성하며, 수집기와 대시보드에서는 읽기 전용입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedSymbol {
    /// 종목 심볼 (고유 키)
    pub symbol: String,
    /// 거래소
    pub exchange: String,
    /// 부가 정보
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
}

impl TrackedSymbol {
    /// 빈 meta를 가진 종목을 생성합니다.
    pub fn new(symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
            meta: serde_json::Map::new(),
        }
    }
}
