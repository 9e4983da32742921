use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lazily-connected pool handle shared across requests. The pool is built on
/// first use rather than at startup so the server can come up (and report
/// itself degraded) without a reachable database.
#[derive(Clone)]
pub struct Database {
    config: DatabaseConfig,
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            config: config.clone(),
            pool: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the shared pool, creating it on first call.
    pub async fn pool(&self) -> Result<PgPool, DatabaseError> {
        // Fast path: try read lock
        {
            let pool = self.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        if self.config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }
        url::Url::parse(&self.config.url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.acquire_timeout_secs))
            .connect(&self.config.url)
            .await?;

        let mut slot = self.pool.write().await;
        // Another request may have connected concurrently; keep the first pool
        if let Some(existing) = slot.as_ref() {
            pool.close().await;
            return Ok(existing.clone());
        }
        *slot = Some(pool.clone());
        info!("Created database pool");
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        let mut slot = self.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_url_reports_missing_config() {
        let db = Database::new(&DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        });
        match db.pool().await {
            Err(DatabaseError::ConfigMissing(name)) => assert_eq!(name, "DATABASE_URL"),
            other => panic!("expected ConfigMissing, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn garbage_url_reports_invalid() {
        let db = Database::new(&DatabaseConfig {
            url: "not a url".to_string(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        });
        assert!(matches!(db.pool().await, Err(DatabaseError::InvalidDatabaseUrl)));
    }
}
