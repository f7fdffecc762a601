//! Yahoo Finance quoteSummary 클라이언트.
//!
//! `GET {base}/v10/finance/quoteSummary/{SYMBOL}{suffix}?modules=...` 응답을
//! 타입이 있는 구조체로 파싱한 뒤 [`FundamentalsSnapshot`]으로 변환합니다.
//! 숫자 필드는 `{"raw": 123.4, "fmt": "123.40"}` 형태이며 `raw`만 사용합니다.

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use screener_core::{FundamentalsProvider, FundamentalsSnapshot, ProviderConfig, ProviderError};

/// 요청할 quoteSummary 모듈.
pub const QUOTE_SUMMARY_MODULES: &str = "defaultKeyStatistics,financialData,summaryProfile,price";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; screener/0.1)";

/// Yahoo Finance quoteSummary 클라이언트.
#[derive(Debug, Clone)]
pub struct YahooFundamentalsClient {
    client: reqwest::Client,
    base_url: String,
    symbol_suffix: String,
    timeout_secs: u64,
}

impl YahooFundamentalsClient {
    /// 설정으로 클라이언트를 생성합니다. 프로세스당 한 번 생성해 공유합니다.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            symbol_suffix: config.symbol_suffix.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn quote_summary_url(&self, symbol: &str) -> String {
        format!(
            "{}/v10/finance/quoteSummary/{}{}",
            self.base_url,
            symbol.trim().to_uppercase(),
            self.symbol_suffix
        )
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFundamentalsClient {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, ProviderError> {
        let url = self.quote_summary_url(symbol);
        debug!(symbol = %symbol, url = %url, "quoteSummary 요청");

        let response = self
            .client
            .get(&url)
            .query(&[("modules", QUOTE_SUMMARY_MODULES)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        parse_quote_summary(&body)
    }
}

/// quoteSummary 응답 본문을 스냅샷으로 파싱합니다.
pub fn parse_quote_summary(body: &[u8]) -> Result<FundamentalsSnapshot, ProviderError> {
    let envelope: QuoteSummaryEnvelope =
        serde_json::from_slice(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let summary = envelope
        .quote_summary
        .ok_or_else(|| ProviderError::Parse("quoteSummary 필드 없음".to_string()))?;

    let description = summary.error.and_then(|e| e.description.or(e.code));

    summary
        .result
        .and_then(|results| results.into_iter().next())
        .map(QuoteSummaryResult::into_snapshot)
        .ok_or(ProviderError::MissingResult(description))
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: Option<QuoteSummary>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<QuoteSummaryError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    default_key_statistics: Option<KeyStatistics>,
    #[serde(default)]
    financial_data: Option<FinancialData>,
    #[serde(default)]
    summary_profile: Option<SummaryProfile>,
    #[serde(default)]
    price: Option<PriceModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatistics {
    market_cap: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    price_to_book: Option<RawValue>,
    trailing_eps: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialData {
    current_price: Option<RawValue>,
    return_on_equity: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryProfile {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    market_cap: Option<RawValue>,
    regular_market_price: Option<RawValue>,
}

/// `{"raw": ..., "fmt": ...}` 값. 빈 객체(`{}`)나 숫자가 아닌 raw는 `None`.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<serde_json::Value>,
}

impl RawValue {
    fn decimal(value: Option<Self>) -> Option<Decimal> {
        value
            .and_then(|v| v.raw)
            .and_then(|raw| raw.as_f64())
            .and_then(Decimal::from_f64)
    }
}

impl QuoteSummaryResult {
    fn into_snapshot(self) -> FundamentalsSnapshot {
        let stats = self.default_key_statistics.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let profile = self.summary_profile.unwrap_or_default();
        let price = self.price.unwrap_or_default();

        FundamentalsSnapshot {
            company_name: price.long_name.or(price.short_name),
            market_cap: RawValue::decimal(stats.market_cap)
                .or_else(|| RawValue::decimal(price.market_cap)),
            trailing_pe: RawValue::decimal(stats.trailing_pe),
            price_to_book: RawValue::decimal(stats.price_to_book),
            return_on_equity: RawValue::decimal(financial.return_on_equity),
            trailing_eps: RawValue::decimal(stats.trailing_eps),
            current_price: RawValue::decimal(financial.current_price)
                .or_else(|| RawValue::decimal(price.regular_market_price)),
            sector: profile.sector,
            industry: profile.industry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    const QUOTE_PATH: &str = "/v10/finance/quoteSummary/TCS.NS";

    fn full_payload() -> String {
        serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "defaultKeyStatistics": {
                        "marketCap": {"raw": 14500000000000.0, "fmt": "14.5T"},
                        "priceToBook": {"raw": 15.2, "fmt": "15.20"},
                        "trailingEps": {"raw": 125.0, "fmt": "125.00"}
                    },
                    "financialData": {
                        "currentPrice": {"raw": 4000.0, "fmt": "4,000.00"},
                        "returnOnEquity": {"raw": 0.47, "fmt": "47.00%"}
                    },
                    "summaryProfile": {
                        "sector": "Technology",
                        "industry": "Information Technology Services"
                    },
                    "price": {"longName": "Tata Consultancy Services Limited"}
                }],
                "error": null
            }
        })
        .to_string()
    }

    fn client_for(server: &mockito::ServerGuard) -> YahooFundamentalsClient {
        YahooFundamentalsClient::new(&ProviderConfig {
            base_url: server.url(),
            symbol_suffix: ".NS".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_parse_full_payload() {
        let snapshot = parse_quote_summary(full_payload().as_bytes()).unwrap();

        assert_eq!(
            snapshot.company_name.as_deref(),
            Some("Tata Consultancy Services Limited")
        );
        assert_eq!(snapshot.market_cap, Some(dec!(14500000000000)));
        assert_eq!(snapshot.trailing_pe, None);
        assert_eq!(snapshot.trailing_eps, Some(dec!(125)));
        assert_eq!(snapshot.current_price, Some(dec!(4000)));
        assert_eq!(snapshot.return_on_equity, Some(dec!(0.47)));
        assert_eq!(snapshot.sector.as_deref(), Some("Technology"));

        // PER은 현재가 / EPS로 계산된다
        let record = snapshot.normalize("TCS");
        assert_eq!(record.pe_ratio, Some(dec!(32)));
    }

    #[test]
    fn test_parse_empty_raw_objects() {
        let body = r#"{"quoteSummary":{"result":[{"defaultKeyStatistics":{"trailingPE":{},"marketCap":{"raw":"n/a"}}}],"error":null}"#;
        let snapshot = parse_quote_summary(body.as_bytes()).unwrap();

        assert_eq!(snapshot.trailing_pe, None);
        assert_eq!(snapshot.market_cap, None);
        assert_eq!(snapshot.sector, None);
    }

    #[test]
    fn test_parse_missing_result_block() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for ticker symbol: XYZ.NS"}}}"#;
        let err = parse_quote_summary(body.as_bytes()).unwrap_err();

        assert_eq!(
            err,
            ProviderError::MissingResult(Some(
                "Quote not found for ticker symbol: XYZ.NS".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_empty_result_array() {
        let body = r#"{"quoteSummary":{"result":[],"error":null}}"#;
        assert_eq!(
            parse_quote_summary(body.as_bytes()).unwrap_err(),
            ProviderError::MissingResult(None)
        );
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_quote_summary(b"<html>blocked</html>"),
            Err(ProviderError::Parse(_))
        ));
        assert!(matches!(
            parse_quote_summary(b"{}"),
            Err(ProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::UrlEncoded(
                "modules".into(),
                QUOTE_SUMMARY_MODULES.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(full_payload())
            .create_async()
            .await;

        let client = client_for(&server);
        let snapshot = client.fetch_fundamentals("tcs").await.unwrap();

        assert_eq!(snapshot.price_to_book, Some(dec!(15.2)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"finance":{"error":{"code":"Unauthorized"}}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch_fundamentals("TCS").await.unwrap_err();

        assert_eq!(err, ProviderError::Status(401));
    }

    #[tokio::test]
    async fn test_fetch_network_failure() {
        // 아무것도 리스닝하지 않는 포트
        let client = YahooFundamentalsClient::new(&ProviderConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            symbol_suffix: ".NS".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        let err = client.fetch_fundamentals("TCS").await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout(_)));
    }
}
