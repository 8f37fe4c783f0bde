//! Database connection management
//!
//! Pools are memoized: the first caller builds the pool, every later
//! (or concurrent) caller gets the same handle.

use once_cell::sync::OnceCell;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Lazily-built, shared PostgreSQL pool
pub struct LazyPool {
    name: &'static str,
    config: DatabaseConfig,
    pool: OnceCell<PgPool>,
}

impl LazyPool {
    pub fn new(name: &'static str, config: DatabaseConfig) -> Self {
        Self {
            name,
            config,
            pool: OnceCell::new(),
        }
    }

    /// Get the pool, building it on first use.
    ///
    /// `connect_lazy` does not touch the network; connection errors
    /// surface on the first acquire, bounded by `acquire_timeout_secs`.
    pub fn get(&self) -> Result<&PgPool, sqlx::Error> {
        self.pool.get_or_try_init(|| {
            let pool = PgPoolOptions::new()
                .max_connections(self.config.max_connections)
                .min_connections(self.config.min_connections)
                .acquire_timeout(Duration::from_secs(self.config.acquire_timeout_secs))
                .max_lifetime(Duration::from_secs(self.config.max_lifetime_minutes * 60))
                .idle_timeout(Duration::from_secs(self.config.idle_timeout_minutes * 60))
                .connect_lazy(&self.config.url)?;
            tracing::info!(pool = self.name, "PostgreSQL connection pool initialized");
            Ok(pool)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.get().is_some()
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(self.get()?).await?;
        Ok(())
    }
}
