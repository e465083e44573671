//! Document store backed by the local SQLite database

use super::{Document, DocumentStore, Fields};
use crate::database::{DocumentRow, Repository};
use crate::error::Result;
use async_trait::async_trait;

/// Stores documents as JSON rows through the [`Repository`]
#[derive(Clone)]
pub struct LocalStore {
    repo: Repository,
}

impl LocalStore {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

fn to_document(row: DocumentRow) -> Result<Document> {
    Ok(Document {
        fields: serde_json::from_str(&row.fields_json)?,
        id: row.id,
    })
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.repo
            .list_documents(collection)
            .await?
            .into_iter()
            .map(to_document)
            .collect()
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let row = self.repo.insert_document(collection, &fields).await?;
        Ok(row.id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.repo.merge_document(collection, id, &fields).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        if !self.repo.delete_document(collection, id).await? {
            tracing::debug!("Delete of absent document {}/{} ignored", collection, id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;
    use crate::error::AppError;
    use serde_json::json;

    async fn create_test_store() -> LocalStore {
        LocalStore::new(Repository::new(create_memory_pool().await.unwrap()))
    }

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_then_list_returns_fields_and_id() {
        let store = create_test_store().await;

        let id = store
            .create("students", fields(json!({ "name": "Asha", "class": "3" })))
            .await
            .unwrap();

        let docs = store.list_all("students").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].fields["class"], "3");
    }

    #[tokio::test]
    async fn test_update_absent_document_is_an_error() {
        let store = create_test_store().await;

        let result = store.update("students", "nope", fields(json!({}))).await;
        assert!(matches!(result, Err(AppError::DocumentNotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_absent_document_is_ok() {
        let store = create_test_store().await;
        store.delete("students", "nope").await.unwrap();
    }
}
