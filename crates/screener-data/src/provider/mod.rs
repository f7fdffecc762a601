//! 재무 데이터 공급자 구현.

pub mod yahoo;

pub use yahoo::YahooFundamentalsClient;
