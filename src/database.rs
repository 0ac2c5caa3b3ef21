//! Database connectivity and the process-wide session provider
//!
//! The pool is configured once during process startup via [`init_pool`];
//! every operation that has neither an explicit nor an ambient session draws
//! its transaction from here. Re-initialization is rejected.

use once_cell::sync::OnceCell;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

use crate::error::{OrmError, OrmResult};

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait for a connection before failing
    pub acquire_timeout: u64,
    /// Seconds a connection may sit idle before being closed
    pub idle_timeout: Option<u64>,
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: 30,
            idle_timeout: Some(600),
            test_before_acquire: true,
        }
    }
}

/// Build a Postgres pool from the given configuration
pub async fn connect(config: &DatabaseConfig) -> OrmResult<Pool<Postgres>> {
    if config.url.is_empty() {
        return Err(OrmError::Configuration(
            "database url is empty".to_string(),
        ));
    }

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .test_before_acquire(config.test_before_acquire);
    if let Some(idle) = config.idle_timeout {
        options = options.idle_timeout(Duration::from_secs(idle));
    }

    let pool = options.connect(&config.url).await?;
    tracing::debug!(
        max_connections = config.max_connections,
        "database pool connected"
    );
    Ok(pool)
}

static POOL: OnceCell<Pool<Postgres>> = OnceCell::new();

/// Install the process-wide pool. Call once during startup, before any model
/// operation; a second call is rejected.
pub fn init_pool(pool: Pool<Postgres>) -> OrmResult<()> {
    POOL.set(pool).map_err(|_| {
        OrmError::Configuration("session provider is already initialized".to_string())
    })?;
    tracing::debug!("session provider initialized");
    Ok(())
}

/// Whether [`init_pool`] has been called
pub fn is_initialized() -> bool {
    POOL.get().is_some()
}

pub(crate) fn pool() -> OrmResult<&'static Pool<Postgres>> {
    POOL.get().ok_or_else(|| {
        OrmError::Configuration(
            "session provider is not initialized; call init_pool first".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_bounded() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, 30);
        assert_eq!(config.idle_timeout, Some(600));
        assert!(config.test_before_acquire);
    }

    #[tokio::test]
    async fn connect_rejects_empty_url() {
        let config = DatabaseConfig::default();
        let err = connect(&config).await.unwrap_err();
        assert!(matches!(err, OrmError::Configuration(_)));
    }
}
