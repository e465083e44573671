//! Error types for Rollcall
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend, which renders every
//! failure through the same `{ kind, message, fields }` shape.

use crate::validation::FieldErrors;
use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "desktop")]
    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),

    #[error("Login failed. {0}")]
    Auth(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Student record is invalid")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Stable category name used by the frontend to pick a presentation.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Auth(_) | AppError::NotAuthenticated => "auth",
            AppError::Validation(_) => "validation",
            AppError::Database(_)
            | AppError::Http(_)
            | AppError::Store(_)
            | AppError::DocumentNotFound { .. }
            | AppError::StudentNotFound(_) => "store",
            AppError::InvalidState(_) => "state",
            AppError::Config(_) => "config",
            _ => "internal",
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let fields = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };

        let mut state = serializer.serialize_struct("AppError", 3)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.serialize_field("fields", &fields)?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
