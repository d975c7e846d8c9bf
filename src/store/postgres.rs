//! PostgreSQL rate store backed by an sqlx connection pool.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

use super::RateStore;
use crate::context::RequestContext;
use crate::error::{RateError, Result};
use crate::quote::Quote;

/// Insert statement for one quote. The timestamp is bound as RFC 3339 text.
pub const INSERT_RATE_SQL: &str =
    r#"INSERT INTO "Rate" ("ask", "bid", "timestamp") VALUES ($1, $2, $3::timestamptz)"#;

/// How long pool checkout may wait for a free or new connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed rate store
#[derive(Debug, Clone)]
pub struct PostgresRateStore {
    pool: PgPool,
}

impl PostgresRateStore {
    /// Connect to a PostgreSQL database, failing if it is unreachable.
    pub async fn connect(options: PgConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| {
                RateError::Persistence(format!("failed to connect to database: {}", e))
            })?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[async_trait]
impl RateStore for PostgresRateStore {
    async fn save_quote(&self, ctx: &RequestContext, quote: &Quote) -> Result<()> {
        let insert = sqlx::query(INSERT_RATE_SQL)
            .bind(quote.ask())
            .bind(quote.bid())
            .bind(quote.observed_at_rfc3339())
            .execute(&self.pool);

        let result = ctx
            .run(insert)
            .await
            .ok_or_else(|| RateError::Persistence("request context deadline exceeded".to_string()))?
            .map_err(|e| {
                RateError::Persistence(format!("error while executing SaveRate sql request: {}", e))
            })?;

        debug!(rows = result.rows_affected(), "Quote persisted");
        Ok(())
    }
}
