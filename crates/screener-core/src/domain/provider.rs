//! 재무 데이터 공급자 trait.

use async_trait::async_trait;

use super::fundamentals::FundamentalsSnapshot;
use crate::error::ProviderError;

/// 종목 단위 재무 데이터 공급자.
///
/// 구현체는 여러 종목을 동시에 조회할 수 있도록 `Send + Sync`여야 하며,
/// 한 종목의 실패가 다른 종목 조회에 영향을 주어서는 안 됩니다.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// 공급자 이름 (로그용).
    fn name(&self) -> &str;

    /// 한 종목의 재무 스냅샷을 조회합니다.
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, ProviderError>;
}
