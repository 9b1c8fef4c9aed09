use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use wardline_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Opens the patient-store pool described by `config`. Every pooled
/// connection gets the same PRAGMA setup, so a lookup behaves identically
/// whichever connection serves it.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

#[cfg(test)]
pub(crate) fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:?cache=shared".to_string(),
        max_connections: 1,
        timeout_secs: 5,
    }
}
