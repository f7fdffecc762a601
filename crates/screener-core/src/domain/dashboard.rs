//! 대시보드 행 병합.
//!
//! 추적 종목 × 일별 점수 × 재무 지표 조인은 점수 관계가 1:N이므로
//! 종목당 여러 행을 만듭니다. [`collapse_dashboard_rows`]는 이를 종목당
//! 정확히 한 행으로 줄입니다.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fundamentals::FundamentalsRecord;

/// 저장소가 반환하는 조인 행 (병합 전).
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardJoinRow {
    pub symbol: String,
    pub exchange: String,
    /// 점수 일자 (점수가 없으면 `None`)
    pub score_date: Option<NaiveDate>,
    pub combined_score: Option<Decimal>,
    pub fundamentals: Option<FundamentalsRecord>,
}

/// 대시보드 표시용 행 (저장되지 않음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub symbol: String,
    pub exchange: String,
    /// 최신 일자의 종합 점수
    pub combined_score: Option<Decimal>,
    /// `combined_score`의 일자
    pub score_date: Option<NaiveDate>,
    pub fundamentals: Option<FundamentalsRecord>,
    pub company_name: Option<String>,
}

/// 조인 행을 종목당 한 행으로 병합합니다.
///
/// 종목은 처음 등장한 순서를 유지합니다. 각 종목의 점수 그룹은 일자
/// 내림차순으로 직접 정렬한 뒤 첫 행을 사용하므로, 저장소의 조인 정렬
/// 보장 여부와 관계없이 최신 점수가 선택됩니다. 같은 일자끼리는 저장소
/// 순서를 따릅니다.
pub fn collapse_dashboard_rows(rows: Vec<DashboardJoinRow>) -> Vec<DashboardRow> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<DashboardJoinRow>> = HashMap::new();

    for row in rows {
        let group = groups.entry(row.symbol.clone()).or_insert_with(|| {
            order.push(row.symbol.clone());
            Vec::new()
        });
        group.push(row);
    }

    order
        .into_iter()
        .filter_map(|symbol| {
            let mut group = groups.remove(&symbol)?;
            // None < Some 이므로 점수 없는 행은 뒤로 밀린다
            group.sort_by(|a, b| b.score_date.cmp(&a.score_date));

            let fundamentals = group.iter().find_map(|r| r.fundamentals.clone());
            let latest = group.into_iter().next()?;
            let company_name = fundamentals
                .as_ref()
                .and_then(|f| f.company_name.clone());

            Some(DashboardRow {
                symbol: latest.symbol,
                exchange: latest.exchange,
                combined_score: latest.score_date.and(latest.combined_score),
                score_date: latest.score_date,
                fundamentals,
                company_name,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(symbol: &str, date: Option<(i32, u32, u32)>, score: Option<Decimal>) -> DashboardJoinRow {
        DashboardJoinRow {
            symbol: symbol.to_string(),
            exchange: "NSE".to_string(),
            score_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            combined_score: score,
            fundamentals: None,
        }
    }

    #[test]
    fn test_latest_score_selected_regardless_of_order() {
        // 오래된 점수가 먼저 와도 최신 점수가 선택되어야 한다
        let rows = vec![
            row("TCS", Some((2024, 1, 1)), Some(dec!(0.1))),
            row("TCS", Some((2024, 2, 1)), Some(dec!(0.5))),
        ];

        let collapsed = collapse_dashboard_rows(rows);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].combined_score, Some(dec!(0.5)));
        assert_eq!(collapsed[0].score_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let rows = vec![
            row("WIPRO", None, None),
            row("INFY", Some((2024, 3, 1)), Some(dec!(0.7))),
            row("WIPRO", None, None),
            row("HDFC", Some((2024, 3, 1)), Some(dec!(0.2))),
            row("INFY", Some((2024, 2, 1)), Some(dec!(0.3))),
        ];

        let symbols: Vec<_> = collapse_dashboard_rows(rows)
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        assert_eq!(symbols, vec!["WIPRO", "INFY", "HDFC"]);
    }

    #[test]
    fn test_symbol_without_scores_has_null_score() {
        let collapsed = collapse_dashboard_rows(vec![row("ITC", None, None)]);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].combined_score, None);
        assert_eq!(collapsed[0].fundamentals, None);
        assert_eq!(collapsed[0].company_name, None);
    }

    #[test]
    fn test_company_name_taken_from_fundamentals() {
        let fundamentals = FundamentalsRecord {
            symbol: "TCS".to_string(),
            company_name: Some("Tata Consultancy Services".to_string()),
            market_cap: Some(dec!(1000)),
            pe_ratio: None,
            pb_ratio: None,
            roe: None,
            eps: None,
            sector: "Technology".to_string(),
            industry: "Software".to_string(),
            data_source: Default::default(),
        };
        let mut with_fundamentals = row("TCS", Some((2024, 1, 1)), Some(dec!(0.4)));
        with_fundamentals.fundamentals = Some(fundamentals.clone());

        let collapsed = collapse_dashboard_rows(vec![with_fundamentals]);
        assert_eq!(collapsed[0].fundamentals, Some(fundamentals));
        assert_eq!(
            collapsed[0].company_name.as_deref(),
            Some("Tata Consultancy Services")
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(collapse_dashboard_rows(Vec::new()).is_empty());
    }
}
