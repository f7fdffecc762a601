//! 데이터 수집 모듈.

pub mod fundamental_ingest;
pub mod symbol_seed;
pub mod synthetic;

pub use fundamental_ingest::{ingest_fundamentals, IngestOptions, IngestResult};
pub use symbol_seed::{parse_symbols_csv, seed_symbols_from_csv, CsvSeedError, CsvSeedResult};
pub use synthetic::{generate_fallback_records, FALLBACK_NOTE, MAX_FALLBACK_RECORDS};
