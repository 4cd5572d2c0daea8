// Database - SQLite connection pool and schema migrations

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{migrate::Migrator, Sqlite, SqliteConnection, Transaction};
use std::str::FromStr;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

pub type DbPool = SqlitePool;
pub type DbConnection = SqliteConnection;
pub type DbTransaction = Transaction<'static, Sqlite>;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the connection pool and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> AppResult<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| AppError::Configuration(format!("Invalid DATABASE_URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let filename = options.clone().get_filename();
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Configuration(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to {}: {}", config.url, e)))?;
    info!("Connected to database at {}", config.url);

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

/// Open a transaction that takes the database write lock up front.
///
/// A deferred transaction that reads before writing cannot wait out a
/// competing writer, SQLite fails the lock upgrade with SQLITE_BUSY. Starting
/// with a write statement makes the lock wait honour the busy timeout.
pub async fn begin_write(pool: &DbPool) -> AppResult<DbTransaction> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE users SET id = id WHERE 0")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Health check to verify database connectivity
pub async fn health_check(pool: &DbPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_creates_the_database_directory() {
        let dir = std::env::temp_dir().join(format!("social_feed-{}", uuid::Uuid::new_v4()));
        let config = DatabaseConfig {
            url: format!("sqlite:{}", dir.join("nested/feed.db").display()),
            max_connections: 1,
        };

        let pool = connect(&config).await.unwrap();
        health_check(&pool).await.unwrap();
        assert!(dir.join("nested/feed.db").exists());

        pool.close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
