//! Tauri commands exposed to the frontend
//!
//! This module organizes commands into logical submodules:
//! - `session`: Sign-in, sign-out, first-run account and routing
//! - `students`: Students console (listing, drafts, view, delete)
//!
//! All commands take AppState, return `Result<T, AppError>` and are async
//! when they reach a provider or store.

pub mod session;
pub mod students;

use crate::app::AppState;
use crate::error::Result;
use tauri::State;

// Re-export all commands for convenient registration in main.rs
pub use session::*;
pub use students::*;

/// Get application information
#[tauri::command]
pub async fn get_app_info(state: State<'_, AppState>) -> Result<AppInfo> {
    let backend = match state.settings.backend {
        crate::services::BackendSettings::Local => "local",
        crate::services::BackendSettings::Firebase(_) => "firebase",
    };

    Ok(AppInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        app_data_dir: state.app_data_dir.to_string_lossy().to_string(),
        backend: backend.to_string(),
        collection: state.students.collection().to_string(),
    })
}

/// Application information structure
#[derive(serde::Serialize)]
pub struct AppInfo {
    pub version: String,
    pub app_data_dir: String,
    pub backend: String,
    pub collection: String,
}
