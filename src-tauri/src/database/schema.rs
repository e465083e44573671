//! Database schema and migrations
//!
//! Versioned SQL scripts are applied in order, each inside its own
//! transaction, and recorded in the `migrations` table.

use crate::error::Result;
use sqlx::{sqlite::SqlitePool, Row};

/// Ordered migration scripts
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("migrations/001_initial_schema.sql"))];

/// Initialize database with schema
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing database schema");

    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version = schema_version(pool).await?;
    tracing::info!("Current database version: {}", current_version);

    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current_version) {
        apply_migration(pool, *version, sql).await?;
    }

    tracing::info!("Database initialization complete");
    Ok(())
}

/// Highest applied migration version (0 for a fresh database)
pub async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    let version: i64 = sqlx::query("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?
        .get(0);

    Ok(version)
}

async fn apply_migration(pool: &SqlitePool, version: i64, sql: &str) -> Result<()> {
    tracing::info!("Applying migration version {}", version);

    let mut tx = pool.begin().await?;

    for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    sqlx::query("INSERT INTO migrations (version) VALUES (?)")
        .bind(version)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Migration version {} applied successfully", version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_database() {
        let pool = memory_pool().await;

        initialize_database(&pool).await.unwrap();

        let latest = MIGRATIONS.last().map(|(v, _)| *v).unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), latest);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"accounts".to_string()));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = memory_pool().await;

        initialize_database(&pool).await.unwrap();
        initialize_database(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(applied as usize, MIGRATIONS.len());
    }
}
