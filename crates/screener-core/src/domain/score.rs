//! 일별 점수 (stock_daily_scores).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 종목별 일별 종합 점수.
///
/// 외부 스캐너가 종목/일자당 한 행씩 추가합니다. 이 크레이트에서는 읽기 전용입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyScoreRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub combined_score: Decimal,
}
