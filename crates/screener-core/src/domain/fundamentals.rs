//! 재무 지표 레코드와 공급자 스냅샷 정규화.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 섹터/업종이 없을 때 사용하는 값.
pub const UNKNOWN_CLASSIFICATION: &str = "Unknown";

/// 재무 지표 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// 공급자에서 실제로 조회한 값
    #[default]
    YahooFinance,
    /// 배치 전체 조회 실패 시 생성한 대체값
    Synthetic,
}

impl DataSource {
    /// 저장소에 기록되는 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YahooFinance => "yahoo_finance",
            Self::Synthetic => "synthetic",
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yahoo_finance" => Ok(Self::YahooFinance),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(format!("Unknown data source: {}", other)),
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 종목별 재무 지표 (fundamentals).
///
/// 종목당 한 행이며 수집할 때마다 전체 행이 교체됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    /// 종목 심볼 (고유 키)
    pub symbol: String,
    /// 회사명
    pub company_name: Option<String>,
    /// 시가총액
    pub market_cap: Option<Decimal>,
    /// PER
    pub pe_ratio: Option<Decimal>,
    /// PBR
    pub pb_ratio: Option<Decimal>,
    /// ROE (비율, 0.15 = 15%)
    pub roe: Option<Decimal>,
    /// EPS
    pub eps: Option<Decimal>,
    /// 섹터
    pub sector: String,
    /// 업종
    pub industry: String,
    /// 데이터 출처
    #[serde(default)]
    pub data_source: DataSource,
}

impl FundamentalsRecord {
    /// 대체 데이터로 생성된 레코드인지 여부.
    pub fn is_synthetic(&self) -> bool {
        self.data_source == DataSource::Synthetic
    }
}

/// 공급자 응답을 파싱한 중간 구조체.
///
/// 모든 필드는 선택적이며, [`FundamentalsSnapshot::normalize`]에서
/// 기본값 규칙이 적용됩니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalsSnapshot {
    pub company_name: Option<String>,
    pub market_cap: Option<Decimal>,
    pub trailing_pe: Option<Decimal>,
    pub price_to_book: Option<Decimal>,
    pub return_on_equity: Option<Decimal>,
    pub trailing_eps: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl FundamentalsSnapshot {
    /// 스냅샷을 저장용 레코드로 정규화합니다.
    ///
    /// - PER: 공급자가 제공하면 그대로, 없으면 `현재가 / EPS` (EPS가 0이면 `None`)
    /// - 섹터/업종: 없거나 빈 문자열이면 `"Unknown"`
    pub fn normalize(self, symbol: &str) -> FundamentalsRecord {
        let pe_ratio = self
            .trailing_pe
            .or_else(|| derive_pe_ratio(self.current_price, self.trailing_eps));

        FundamentalsRecord {
            symbol: symbol.to_string(),
            company_name: non_empty(self.company_name),
            market_cap: self.market_cap,
            pe_ratio,
            pb_ratio: self.price_to_book,
            roe: self.return_on_equity,
            eps: self.trailing_eps,
            sector: non_empty(self.sector).unwrap_or_else(|| UNKNOWN_CLASSIFICATION.to_string()),
            industry: non_empty(self.industry)
                .unwrap_or_else(|| UNKNOWN_CLASSIFICATION.to_string()),
            data_source: DataSource::YahooFinance,
        }
    }
}

/// 현재가와 EPS로 PER을 계산합니다 (소수점 4자리).
pub fn derive_pe_ratio(price: Option<Decimal>, eps: Option<Decimal>) -> Option<Decimal> {
    match (price, eps) {
        (Some(price), Some(eps)) if !eps.is_zero() => {
            price.checked_div(eps).map(|pe| pe.round_dp(4))
        }
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
