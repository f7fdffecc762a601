//! 저장소 구현.
//!
//! - [`PgScreenerStore`]: Postgres (운영)
//! - [`MemoryStore`]: 메모리 (테스트/로컬 실행)

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgScreenerStore;
