//! Repository layer for database operations
//!
//! This module provides CRUD operations for stored documents and local
//! accounts. Multi-statement operations run in a transaction.

use super::models::*;
use crate::error::{AppError, Result};
use crate::storage::Fields;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Documents =====

    /// Insert a new document with a generated id
    pub async fn insert_document(&self, collection: &str, fields: &Fields) -> Result<DocumentRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let fields_json = serde_json::to_string(fields)?;

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, fields_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(&fields_json)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Inserted document {}/{}", collection, id);
        Ok(row)
    }

    /// Get a document by collection and id
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<DocumentRow>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT * FROM documents WHERE collection = ? AND id = ?
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List every document of a collection, oldest first
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentRow>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT * FROM documents
            WHERE collection = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Merge `patch` over the stored fields of an existing document
    pub async fn merge_document(
        &self,
        collection: &str,
        id: &str,
        patch: &Fields,
    ) -> Result<DocumentRow> {
        let mut tx = self.pool.begin().await?;

        let stored: String = sqlx::query_scalar(
            "SELECT fields_json FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        let mut fields: Fields = serde_json::from_str(&stored)?;
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents SET fields_json = ?, updated_at = ?
            WHERE collection = ? AND id = ?
            RETURNING *
            "#,
        )
        .bind(serde_json::to_string(&fields)?)
        .bind(Utc::now())
        .bind(collection)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Updated document {}/{}", collection, id);
        Ok(row)
    }

    /// Delete a document, returning whether it existed
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted document {}/{} ({} rows)", collection, id, rows);
        Ok(rows > 0)
    }

    // ===== Accounts =====

    /// Create a local account; emails are unique ignoring case
    pub async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account> {
        if self.find_account_by_email(email).await?.is_some() {
            return Err(AppError::Generic(format!("Account already exists: {}", email)));
        }

        let id = Uuid::new_v4().to_string();

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created account: {}", id);
        Ok(account)
    }

    /// Insert an account only while the table is empty.
    ///
    /// The emptiness check and the insert are one statement, so concurrent
    /// callers cannot both succeed. Returns `None` when an account exists.
    pub async fn create_first_account(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<Account>> {
        let id = Uuid::new_v4().to_string();

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, created_at)
            SELECT ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM accounts)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match &account {
            Some(_) => tracing::debug!("Created first account: {}", id),
            None => tracing::debug!("First account already exists; {} not created", email),
        }

        Ok(account)
    }

    /// Look up an account by email (case-insensitive)
    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Number of local accounts
    pub async fn count_accounts(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
