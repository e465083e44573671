//! Database models
//!
//! Rust structs representing rows of the local database.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A stored document; `fields_json` holds a JSON object
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub collection: String,
    pub id: String,
    pub fields_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Local sign-in account
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string, never sent to the frontend
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
