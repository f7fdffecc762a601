//! Postgres 저장소.
//!
//! 프로세스 시작 시 한 번 연결 풀을 만들고 모든 요청이 공유합니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::{debug, info, instrument, warn};

use screener_core::{
    DailyScoreRecord, DashboardJoinRow, DataSource, FundamentalsFilter, FundamentalsRecord, ScreenerStore,
    StorageConfig, StorageError, StorageResult, TrackedSymbol, UNKNOWN_CLASSIFICATION,
};

/// Postgres 기반 [`ScreenerStore`].
#[derive(Clone, Debug)]
pub struct PgScreenerStore {
    pool: PgPool,
}

impl PgScreenerStore {
    /// 연결 풀을 생성하고 첫 연결까지 확인합니다.
    ///
    /// 서비스 자격증명은 연결 비밀번호로 적용됩니다.
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        info!("Connecting to database...");

        let pool = pool_options(config)
            .connect_with(connect_options(config)?)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        info!("Database connection established");
        Ok(Self { pool })
    }

    /// 연결 없이 풀만 생성합니다.
    ///
    /// 연결은 첫 요청 시 맺어지고, 끊어진 연결은 이후 요청에서 다시 맺어집니다.
    /// 데이터베이스가 서버보다 늦게 뜨는 경우에도 재시작 없이 복구됩니다.
    pub fn connect_lazy(config: &StorageConfig) -> StorageResult<Self> {
        let pool = pool_options(config).connect_lazy_with(connect_options(config)?);
        info!("Database pool created (lazy connect)");
        Ok(Self { pool })
    }

    /// 기존 풀을 재사용합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 내부 연결 풀.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 스키마 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("migration failed: {}", e)))?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 풀을 닫습니다.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(Debug, FromRow)]
struct TrackedSymbolRow {
    symbol: String,
    exchange: String,
    meta: Json<serde_json::Map<String, serde_json::Value>>,
}

impl From<TrackedSymbolRow> for TrackedSymbol {
    fn from(row: TrackedSymbolRow) -> Self {
        Self {
            symbol: row.symbol,
            exchange: row.exchange,
            meta: row.meta.0,
        }
    }
}

#[derive(Debug, FromRow)]
struct FundamentalsRow {
    symbol: String,
    company_name: Option<String>,
    market_cap: Option<Decimal>,
    pe_ratio: Option<Decimal>,
    pb_ratio: Option<Decimal>,
    roe: Option<Decimal>,
    eps: Option<Decimal>,
    sector: String,
    industry: String,
    data_source: String,
}

impl TryFrom<FundamentalsRow> for FundamentalsRecord {
    type Error = StorageError;

    fn try_from(row: FundamentalsRow) -> StorageResult<Self> {
        let data_source = parse_data_source(&row.symbol, &row.data_source)?;
        Ok(Self {
            symbol: row.symbol,
            company_name: row.company_name,
            market_cap: row.market_cap,
            pe_ratio: row.pe_ratio,
            pb_ratio: row.pb_ratio,
            roe: row.roe,
            eps: row.eps,
            sector: row.sector,
            industry: row.industry,
            data_source,
        })
    }
}

#[derive(Debug, FromRow)]
struct DailyScoreRow {
    symbol: String,
    date: NaiveDate,
    combined_score: Decimal,
}

/// 대시보드 조인 행. 재무 지표 컬럼은 LEFT JOIN이라 모두 nullable.
#[derive(Debug, FromRow)]
struct DashboardDbRow {
    symbol: String,
    exchange: String,
    score_date: Option<NaiveDate>,
    combined_score: Option<Decimal>,
    f_symbol: Option<String>,
    company_name: Option<String>,
    market_cap: Option<Decimal>,
    pe_ratio: Option<Decimal>,
    pb_ratio: Option<Decimal>,
    roe: Option<Decimal>,
    eps: Option<Decimal>,
    sector: Option<String>,
    industry: Option<String>,
    data_source: Option<String>,
}

impl TryFrom<DashboardDbRow> for DashboardJoinRow {
    type Error = StorageError;

    fn try_from(row: DashboardDbRow) -> StorageResult<Self> {
        let fundamentals = match row.f_symbol {
            Some(symbol) => {
                let data_source = match row.data_source.as_deref() {
                    Some(raw) => parse_data_source(&symbol, raw)?,
                    None => DataSource::default(),
                };

                Some(FundamentalsRecord {
                    symbol,
                    company_name: row.company_name,
                    market_cap: row.market_cap,
                    pe_ratio: row.pe_ratio,
                    pb_ratio: row.pb_ratio,
                    roe: row.roe,
                    eps: row.eps,
                    sector: row
                        .sector
                        .unwrap_or_else(|| UNKNOWN_CLASSIFICATION.to_string()),
                    industry: row
                        .industry
                        .unwrap_or_else(|| UNKNOWN_CLASSIFICATION.to_string()),
                    data_source,
                })
            }
            None => None,
        };

        Ok(Self {
            symbol: row.symbol,
            exchange: row.exchange,
            score_date: row.score_date,
            combined_score: row.combined_score,
            fundamentals,
        })
    }
}

/// 저장된 `data_source` 값을 해석합니다. 알 수 없는 값은 조회 에러입니다.
fn parse_data_source(symbol: &str, raw: &str) -> StorageResult<DataSource> {
    raw.parse().map_err(|e: String| {
        warn!(symbol = %symbol, data_source = %raw, "알 수 없는 data_source");
        StorageError::Query(format!("{}: {}", symbol, e))
    })
}

fn connect_options(config: &StorageConfig) -> StorageResult<PgConnectOptions> {
    Ok(config
        .database_url
        .parse::<PgConnectOptions>()
        .map_err(|e| StorageError::Connection(format!("invalid DATABASE_URL: {}", e)))?
        .password(config.service_key.expose_secret()))
}

fn pool_options(config: &StorageConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl ScreenerStore for PgScreenerStore {
    #[instrument(skip(self))]
    async fn list_tracked_symbols(&self, limit: usize) -> StorageResult<Vec<TrackedSymbol>> {
        let rows = sqlx::query_as::<_, TrackedSymbolRow>(
            r#"
            SELECT symbol, exchange, meta
            FROM screened_stocks
            ORDER BY symbol
            LIMIT $1
            "#,
        )
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TrackedSymbol::from).collect())
    }

    #[instrument(skip(self, symbols), fields(count = symbols.len()))]
    async fn upsert_tracked_symbols(&self, symbols: &[TrackedSymbol]) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;

        for symbol in symbols {
            sqlx::query(
                r#"
                INSERT INTO screened_stocks (symbol, exchange, meta)
                VALUES ($1, $2, $3)
                ON CONFLICT (symbol) DO UPDATE SET
                    exchange = EXCLUDED.exchange,
                    meta = EXCLUDED.meta
                "#,
            )
            .bind(&symbol.symbol)
            .bind(&symbol.exchange)
            .bind(Json(&symbol.meta))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(count = symbols.len(), "추적 종목 upsert 완료");
        Ok(symbols.len())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert_fundamentals(&self, records: &[FundamentalsRecord]) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO fundamentals (
                    symbol, company_name, market_cap, pe_ratio, pb_ratio,
                    roe, eps, sector, industry, data_source, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
                ON CONFLICT (symbol) DO UPDATE SET
                    company_name = EXCLUDED.company_name,
                    market_cap = EXCLUDED.market_cap,
                    pe_ratio = EXCLUDED.pe_ratio,
                    pb_ratio = EXCLUDED.pb_ratio,
                    roe = EXCLUDED.roe,
                    eps = EXCLUDED.eps,
                    sector = EXCLUDED.sector,
                    industry = EXCLUDED.industry,
                    data_source = EXCLUDED.data_source,
                    updated_at = NOW()
                "#,
            )
            .bind(&record.symbol)
            .bind(&record.company_name)
            .bind(record.market_cap)
            .bind(record.pe_ratio)
            .bind(record.pb_ratio)
            .bind(record.roe)
            .bind(record.eps)
            .bind(&record.sector)
            .bind(&record.industry)
            .bind(record.data_source.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(records.len())
    }

    async fn list_fundamentals(
        &self,
        filter: &FundamentalsFilter,
    ) -> StorageResult<Vec<FundamentalsRecord>> {
        let rows = sqlx::query_as::<_, FundamentalsRow>(
            r#"
            SELECT symbol, company_name, market_cap, pe_ratio, pb_ratio,
                   roe, eps, sector, industry, data_source
            FROM fundamentals
            WHERE ($1::TEXT IS NULL OR symbol = $1)
              AND ($2::TEXT IS NULL OR sector = $2)
            ORDER BY market_cap DESC NULLS LAST, symbol
            "#,
        )
        .bind(&filter.symbol)
        .bind(&filter.sector)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FundamentalsRecord::try_from).collect()
    }

    async fn get_daily_score(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> StorageResult<Option<DailyScoreRecord>> {
        let row = sqlx::query_as::<_, DailyScoreRow>(
            r#"
            SELECT symbol, date, combined_score
            FROM stock_daily_scores
            WHERE symbol = $1 AND date = $2
            "#,
        )
        .bind(symbol)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| DailyScoreRecord {
            symbol: r.symbol,
            date: r.date,
            combined_score: r.combined_score,
        }))
    }

    #[instrument(skip(self))]
    async fn fetch_dashboard_join(&self, limit: usize) -> StorageResult<Vec<DashboardJoinRow>> {
        // 종목을 먼저 limit개 고른 뒤 조인한다 (limit은 조인 행 수가 아닌 종목 수)
        let rows = sqlx::query_as::<_, DashboardDbRow>(
            r#"
            WITH selected AS (
                SELECT symbol, exchange
                FROM screened_stocks
                ORDER BY symbol
                LIMIT $1
            )
            SELECT s.symbol, s.exchange,
                   d.date AS score_date, d.combined_score,
                   f.symbol AS f_symbol, f.company_name, f.market_cap, f.pe_ratio,
                   f.pb_ratio, f.roe, f.eps, f.sector, f.industry, f.data_source
            FROM selected s
            LEFT JOIN stock_daily_scores d ON d.symbol = s.symbol
            LEFT JOIN fundamentals f ON f.symbol = s.symbol
            ORDER BY s.symbol, d.date DESC NULLS LAST
            "#,
        )
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DashboardJoinRow::try_from).collect()
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
