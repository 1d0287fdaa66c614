use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Row;
use std::time::Duration;
use tracing::{error, info};

use crate::db::store::{SnapshotStore, StoreError};
use crate::models::{DocumentId, Snapshot};

/// PostgreSQL backed snapshot store
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - Store with a connected pool, or error
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the documents table if it does not exist yet
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let query_sql = r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
        "#;
        sqlx::query(query_sql).execute(&self.pool).await?;
        Ok(())
    }

    fn log_pool_state(&self, action: &str, id: &DocumentId) {
        let pool_idle = self.pool.num_idle() as u32;
        let pool_size = self.pool.size();
        info!(
            "{} document {}. Pool connections: {} idle, {} in use",
            action,
            id,
            pool_idle,
            pool_size.saturating_sub(pool_idle)
        );
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn load(&self, id: &DocumentId) -> Result<Snapshot, StoreError> {
        self.log_pool_state("Loading", id);

        let row = sqlx::query("SELECT data FROM documents WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error loading document '{}': {}", id, e);
                e
            })?;

        match row {
            Some(row) => {
                let data: Json<serde_json::Value> = row.try_get("data")?;
                Ok(Snapshot(data.0))
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn create(&self, id: &DocumentId, initial: Snapshot) -> Result<Snapshot, StoreError> {
        self.log_pool_state("Creating", id);

        // A racing join may have inserted the row first, in which case nothing is returned
        let query_sql = r#"
            INSERT INTO documents (id, data)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            RETURNING data;
        "#;
        let row = sqlx::query(query_sql)
            .bind(id.as_str())
            .bind(Json(&initial.0))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(_) => {
                info!("Document '{}' created", id);
                Ok(initial)
            }
            None => self.load(id).await,
        }
    }

    async fn update(&self, id: &DocumentId, snapshot: Snapshot) -> Result<(), StoreError> {
        let query_sql = r#"
            UPDATE documents
            SET data = $1,
                updated_at = NOW()
            WHERE id = $2;
        "#;
        let res = sqlx::query(query_sql)
            .bind(Json(&snapshot.0))
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
