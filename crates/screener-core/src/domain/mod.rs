//! 스크리너 도메인 모델과 협력자 trait.

pub mod dashboard;
pub mod fundamentals;
pub mod provider;
pub mod score;
pub mod store;
pub mod symbol;

pub use dashboard::{collapse_dashboard_rows, DashboardJoinRow, DashboardRow};
pub use fundamentals::{DataSource, FundamentalsRecord, FundamentalsSnapshot, UNKNOWN_CLASSIFICATION};
pub use provider::FundamentalsProvider;
pub use score::DailyScoreRecord;
pub use store::{FundamentalsFilter, ScreenerStore};
pub use symbol::{TrackedSymbol, DEFAULT_EXCHANGE};
