//! Connection facility - pool configuration and expression execution
//!
//! Thin execution layer over a PostgreSQL pool. Resolution and query
//! composition never touch it; blocking and timeout semantics live here.

use std::time::Duration;

use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use tracing::debug;

use crate::error::PoolError;
use crate::query::QueryExpression;

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Acquire timeout, seconds
    pub acquire_timeout: u64,
    /// Idle timeout, seconds
    pub idle_timeout: Option<u64>,
    /// Maximum connection lifetime, seconds
    pub max_lifetime: Option<u64>,
    pub test_before_acquire: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: 30,
            idle_timeout: Some(600),
            max_lifetime: Some(1800),
            test_before_acquire: true,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_connections == 0 {
            return Err(PoolError::ConfigurationError {
                message: "max_connections must be at least 1".to_string(),
            });
        }
        if self.min_connections > self.max_connections {
            return Err(PoolError::ConfigurationError {
                message: format!(
                    "min_connections ({}) exceeds max_connections ({})",
                    self.min_connections, self.max_connections
                ),
            });
        }
        Ok(())
    }
}

/// Create a PostgreSQL connection pool from a database URL
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool, PoolError> {
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .idle_timeout(config.idle_timeout.map(Duration::from_secs))
        .max_lifetime(config.max_lifetime.map(Duration::from_secs))
        .test_before_acquire(config.test_before_acquire)
        .connect(database_url)
        .await?;

    debug!(
        max_connections = config.max_connections,
        "database pool created"
    );
    Ok(pool)
}

/// Bind a parameter with its native PostgreSQL type. PostgreSQL does not
/// implicitly cast `text` to integer or boolean, so values must not be
/// stringified before binding.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) if n.is_i64() => query.bind(n.as_i64()),
        Value::Number(n) => query.bind(n.as_f64()),
        Value::String(s) => query.bind(s.as_str()),
        Value::Null => query.bind(None::<String>),
        other => query.bind(other.clone()),
    }
}

/// Fetch all rows for an expression
pub async fn fetch_expression(
    pool: &PgPool,
    expression: &QueryExpression,
) -> Result<Vec<PgRow>, PoolError> {
    let (sql, params) = expression.to_sql_with_params();
    debug!(%sql, params = params.len(), "fetching expression");

    let mut query = sqlx::query(&sql);
    for param in &params {
        query = bind_value(query, param);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Execute an expression, returning the number of affected rows
pub async fn execute_expression(
    pool: &PgPool,
    expression: &QueryExpression,
) -> Result<u64, PoolError> {
    let (sql, params) = expression.to_sql_with_params();
    debug!(%sql, params = params.len(), "executing expression");

    let mut query = sqlx::query(&sql);
    for param in &params {
        query = bind_value(query, param);
    }
    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
