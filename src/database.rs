use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument, warn};

use crate::shared::AppError;

/// Schema migrations embedded from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Owns the PostgreSQL pool for the lifetime of the process
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Opens the pool; fails fast if the database is unreachable
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        info!(max_connections, "Connecting to database");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to connect to database");
                AppError::DatabaseError(e.to_string())
            })?;

        info!("Database connection established");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded migrations under `migrations/`
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), AppError> {
        info!("Running database migrations");

        MIGRATOR.run(&self.pool).await.map_err(|e| {
            warn!(error = %e, "Failed to run migrations");
            AppError::DatabaseError(e.to_string())
        })?;

        info!("Database migrations applied");
        Ok(())
    }

    /// Truncates every table and restarts id sequences
    #[cfg(any(test, feature = "test-utils"))]
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), AppError> {
        warn!("Resetting database - all users and bookmarks will be removed");

        sqlx::query("TRUNCATE TABLE bookmarks, users RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reset database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    /// Waits for in-flight queries and closes every connection
    #[instrument(skip(self))]
    pub async fn close(self) {
        info!("Closing database pool");
        self.pool.close().await;
        info!("Database pool closed");
    }
}
