use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use wardline_core::config::{AppConfig, ConfigError, LoadOptions};
use wardline_core::domain::patient::PatientRecord;
use wardline_db::{connect, migrations, DbPool, PatientRepository, SqlPatientRepository};
use wardline_line::dispatch::EventDispatcher;
use wardline_line::handler::{LookupError, MessageHandler, PatientLookup};
use wardline_line::LineClient;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub dispatcher: Arc<EventDispatcher>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

/// Adapts the sql patient repository to the webhook core's lookup seam.
/// Repository faults surface as `LookupError::Backend`, which the message
/// handler degrades into a retry reply.
struct DbPatientLookup {
    repository: SqlPatientRepository,
}

#[async_trait]
impl PatientLookup for DbPatientLookup {
    async fn find_by_name(&self, name: &str) -> Result<Option<PatientRecord>, LookupError> {
        self.repository
            .find_by_name(name)
            .await
            .map_err(|error| LookupError::Backend(error.to_string()))
    }
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let lookup = Arc::new(DbPatientLookup {
        repository: SqlPatientRepository::new(db_pool.clone()),
    });
    let sender = Arc::new(LineClient::new(
        config.line.reply_url.clone(),
        config.line.channel_access_token.clone(),
    ));
    let handler =
        MessageHandler::new(lookup, sender, Duration::from_secs(config.line.call_timeout_secs));
    let dispatcher = Arc::new(EventDispatcher::new(handler));

    Ok(Application { config, db_pool, dispatcher })
}

#[cfg(test)]
mod tests {
    use wardline_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn valid_overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                channel_secret: Some("test-channel-secret".to_string()),
                channel_access_token: Some("test-access-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_channel_secret() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                channel_access_token: Some("test-access-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("line.channel_secret"));
    }

    #[tokio::test]
    async fn bootstrap_connects_migrates_and_wires_the_dispatcher() {
        let app = bootstrap(valid_overrides("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'patient'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("patient table should exist after bootstrap");
        assert_eq!(table_count, 1);

        app.db_pool.close().await;
    }
}
