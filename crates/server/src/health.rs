use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use wardline_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: String,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

/// Serves `/health` on its own port so the webhook listener stays
/// signature-gated while probes stay unauthenticated.
pub async fn spawn(bind_address: &str, port: u16, db_pool: DbPool) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(db_pool)).await {
            error!(
                event_name = "system.health.error",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.db_pool).await {
        Ok(_) => Ok("patient store reachable".to_string()),
        Err(error) => Err(format!("patient store query failed: {error}")),
    };

    let (status_code, status, database) = match database {
        Ok(detail) => (StatusCode::OK, "ready", detail),
        Err(detail) => (StatusCode::SERVICE_UNAVAILABLE, "degraded", detail),
    };

    let payload =
        HealthResponse { status, database, checked_at: Utc::now().to_rfc3339() };
    (status_code, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};
    use wardline_core::config::DatabaseConfig;
    use wardline_db::connect;

    use super::{health, HealthState};

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:?cache=shared".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn health_returns_ready_when_database_is_reachable() {
        let pool = connect(&memory_config()).await.expect("pool should connect");

        let (status, Json(payload)) = health(State(HealthState { db_pool: pool.clone() })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");

        pool.close().await;
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_database_is_closed() {
        let pool = connect(&memory_config()).await.expect("pool should connect");
        pool.close().await;

        let (status, Json(payload)) = health(State(HealthState { db_pool: pool })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
    }
}
