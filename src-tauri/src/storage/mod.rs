//! Document store contract and adapters
//!
//! The console only ever talks to a [`DocumentStore`]: a collection of
//! schemaless documents addressed by opaque ids. Two adapters are provided:
//! - `local`: documents kept in the application's SQLite database
//! - `firestore`: Cloud Firestore over its REST API

pub mod firestore;
pub mod local;

pub use firestore::FirestoreStore;
pub use local::LocalStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Field map of a document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A persisted document: its id plus every stored field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Create/read/update/delete over named collections.
///
/// The store enforces nothing about field contents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Persist a new document and return its freshly assigned id
    async fn create(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Overwrite the given fields of an existing document
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Remove a document; removing an absent document is not an error
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}
