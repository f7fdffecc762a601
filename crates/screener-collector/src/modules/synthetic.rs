//! 대체(synthetic) 재무 지표 생성.
//!
//! 배치의 모든 조회가 실패했을 때만 사용됩니다. 값은 무작위지만 범위가
//! 고정되어 있고, 모든 레코드에 `data_source = synthetic`이 표시됩니다.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use screener_core::{DataSource, FundamentalsRecord, TrackedSymbol};

/// 대체 레코드 최대 개수.
pub const MAX_FALLBACK_RECORDS: usize = 3;

/// 대체 데이터 사용 시 에러 목록에 추가되는 안내 문구.
pub const FALLBACK_NOTE: &str =
    "Using synthetic data - fundamentals provider returned no usable results (it may be blocked)";

/// 순환하며 배정되는 (섹터, 업종).
const CLASSIFICATIONS: [(&str, &str); 3] = [
    ("Technology", "Software"),
    ("Finance", "Banking"),
    ("Energy", "Oil & Gas"),
];

/// 배치 앞쪽 최대 3개 종목의 대체 레코드를 생성합니다.
pub fn generate_fallback_records(symbols: &[TrackedSymbol]) -> Vec<FundamentalsRecord> {
    generate_with_rng(symbols, &mut StdRng::from_entropy())
}

/// 주어진 난수 생성기로 대체 레코드를 생성합니다.
///
/// 범위: market_cap [0, 10^12), pe [15, 35), pb [1, 6), roe [0.1, 0.4), eps [10, 60).
/// 소수 값은 소수점 4자리 고정소수로 뽑아 상한을 넘지 않습니다.
pub fn generate_with_rng<R: Rng + ?Sized>(
    symbols: &[TrackedSymbol],
    rng: &mut R,
) -> Vec<FundamentalsRecord> {
    symbols
        .iter()
        .take(MAX_FALLBACK_RECORDS)
        .enumerate()
        .map(|(i, tracked)| {
            let (sector, industry) = CLASSIFICATIONS[i % CLASSIFICATIONS.len()];
            FundamentalsRecord {
                symbol: tracked.symbol.clone(),
                company_name: Some(format!("{} Limited", tracked.symbol)),
                market_cap: Some(Decimal::from(rng.gen_range(0..1_000_000_000_000i64))),
                pe_ratio: Some(Decimal::new(rng.gen_range(150_000..350_000), 4)),
                pb_ratio: Some(Decimal::new(rng.gen_range(10_000..60_000), 4)),
                roe: Some(Decimal::new(rng.gen_range(1_000..4_000), 4)),
                eps: Some(Decimal::new(rng.gen_range(100_000..600_000), 4)),
                sector: sector.to_string(),
                industry: industry.to_string(),
                data_source: DataSource::Synthetic,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tracked(symbols: &[&str]) -> Vec<TrackedSymbol> {
        symbols
            .iter()
            .map(|s| TrackedSymbol::new(*s, "NSE"))
            .collect()
    }

    #[test]
    fn test_at_most_three_records() {
        let records = generate_fallback_records(&tracked(&["A", "B", "C", "D", "E"]));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.is_synthetic()));

        let records = generate_fallback_records(&tracked(&["A"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company_name.as_deref(), Some("A Limited"));
    }

    #[test]
    fn test_classification_cycles() {
        let records = generate_fallback_records(&tracked(&["A", "B", "C"]));
        let sectors: Vec<_> = records.iter().map(|r| r.sector.as_str()).collect();
        let industries: Vec<_> = records.iter().map(|r| r.industry.as_str()).collect();

        assert_eq!(sectors, vec!["Technology", "Finance", "Energy"]);
        assert_eq!(industries, vec!["Software", "Banking", "Oil & Gas"]);
    }

    #[test]
    fn test_values_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let symbols = tracked(&["A", "B", "C"]);

        for _ in 0..200 {
            for r in generate_with_rng(&symbols, &mut rng) {
                let market_cap = r.market_cap.unwrap();
                assert!(market_cap >= Decimal::ZERO && market_cap < dec!(1000000000000));

                let pe = r.pe_ratio.unwrap();
                assert!(pe >= dec!(15) && pe < dec!(35));

                let pb = r.pb_ratio.unwrap();
                assert!(pb >= dec!(1) && pb < dec!(6));

                let roe = r.roe.unwrap();
                assert!(roe >= dec!(0.1) && roe < dec!(0.4));

                let eps = r.eps.unwrap();
                assert!(eps >= dec!(10) && eps < dec!(60));
            }
        }
    }
}
