//! Students service
//!
//! Typed access to the students collection. Writes are validated first;
//! an invalid draft never reaches the store.

use crate::error::{AppError, Result};
use crate::storage::DocumentStore;
use crate::student::{Student, StudentFields};
use crate::validation;
use std::sync::Arc;

/// Service for managing student records
#[derive(Clone)]
pub struct StudentsService {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl StudentsService {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Every student in the collection
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let documents = self.store.list_all(&self.collection).await?;

        let students = documents
            .iter()
            .map(Student::from_document)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Loaded {} students", students.len());
        Ok(students)
    }

    /// Validate and persist a new student
    pub async fn create_student(&self, fields: StudentFields) -> Result<Student> {
        ensure_valid(&fields)?;

        let id = self
            .store
            .create(&self.collection, fields.to_document_fields()?)
            .await?;

        tracing::info!("Student created: {}", id);
        Ok(Student { id, fields })
    }

    /// Validate and overwrite every field of an existing student
    pub async fn update_student(&self, id: &str, fields: StudentFields) -> Result<Student> {
        ensure_valid(&fields)?;

        self.store
            .update(&self.collection, id, fields.to_document_fields()?)
            .await
            .map_err(|e| match e {
                AppError::DocumentNotFound { id, .. } => AppError::StudentNotFound(id),
                other => other,
            })?;

        tracing::info!("Student updated: {}", id);
        Ok(Student {
            id: id.to_string(),
            fields,
        })
    }

    /// Remove a student
    pub async fn delete_student(&self, id: &str) -> Result<()> {
        self.store.delete(&self.collection, id).await?;

        tracing::info!("Student deleted: {}", id);
        Ok(())
    }
}

fn ensure_valid(fields: &StudentFields) -> Result<()> {
    let errors = validation::validate(fields);
    if errors.is_valid() {
        Ok(())
    } else {
        tracing::debug!(
            "Rejected student draft: {:?}",
            errors.messages().map(|(field, _)| field).collect::<Vec<_>>()
        );
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, Repository};
    use crate::storage::LocalStore;
    use crate::student::StudentField;

    async fn create_test_service() -> StudentsService {
        let repo = Repository::new(create_memory_pool().await.unwrap());
        StudentsService::new(Arc::new(LocalStore::new(repo)), "students")
    }

    fn valid_fields() -> StudentFields {
        StudentFields {
            name: "Neha Singh".to_string(),
            class: "4".to_string(),
            section: "A".to_string(),
            roll_number: "9".to_string(),
            address: "3 Hill View".to_string(),
            phone: "9123456780".to_string(),
            email: "neha@example.com".to_string(),
            guardian_name: "Arun Singh".to_string(),
            dob: "2014-08-20".to_string(),
            admission_date: "2019-04-01".to_string(),
            grade: "A".to_string(),
            extra_notes: "Allergic to peanuts".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_student() {
        let service = create_test_service().await;

        let created = service.create_student(valid_fields()).await.unwrap();
        assert!(!created.id.is_empty());

        let students = service.list_students().await.unwrap();
        assert_eq!(students, vec![created]);
    }

    #[tokio::test]
    async fn test_invalid_student_is_not_stored() {
        let service = create_test_service().await;

        let mut fields = valid_fields();
        fields.phone = "12345".to_string();

        match service.create_student(fields).await {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.get(StudentField::Phone), validation::PHONE_MESSAGE);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert!(service.list_students().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_student() {
        let service = create_test_service().await;
        let created = service.create_student(valid_fields()).await.unwrap();

        let mut fields = created.fields.clone();
        fields.class = "5".to_string();
        service.update_student(&created.id, fields).await.unwrap();

        let students = service.list_students().await.unwrap();
        assert_eq!(students[0].fields.class, "5");
        assert_eq!(students[0].fields.name, "Neha Singh");
    }

    #[tokio::test]
    async fn test_update_missing_student() {
        let service = create_test_service().await;

        let result = service.update_student("gone", valid_fields()).await;
        assert!(matches!(result, Err(AppError::StudentNotFound(id)) if id == "gone"));
    }

    #[tokio::test]
    async fn test_delete_student() {
        let service = create_test_service().await;
        let created = service.create_student(valid_fields()).await.unwrap();

        service.delete_student(&created.id).await.unwrap();
        assert!(service.list_students().await.unwrap().is_empty());
    }
}
