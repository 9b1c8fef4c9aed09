use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect;
    use crate::connection::memory_config;

    #[tokio::test]
    async fn migrations_create_patient_table() {
        let pool = connect(&memory_config()).await.expect("pool should connect");

        run_pending(&pool).await.expect("migrations should apply");

        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = 'patient'",
        )
        .fetch_one(&pool)
        .await
        .expect("sqlite_master query should succeed");
        assert_eq!(row.get::<i64, _>("n"), 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect(&memory_config()).await.expect("pool should connect");

        run_pending(&pool).await.expect("first run should apply");
        run_pending(&pool).await.expect("second run should be a no-op");

        pool.close().await;
    }
}
