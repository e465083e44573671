//! Settings service
//!
//! Manages per-installation settings persisted as JSON in the app data
//! directory: which sign-in provider and document store to use, and how to
//! reach them.

use crate::config;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Firebase project connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    /// Override for the Identity Toolkit endpoint (e.g. the auth emulator)
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    /// Override for the Firestore endpoint (e.g. the Firestore emulator)
    #[serde(default = "default_firestore_endpoint")]
    pub firestore_endpoint: String,
    /// Override for the Secure Token endpoint used to refresh ID tokens
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
}

fn default_auth_endpoint() -> String {
    config::DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_firestore_endpoint() -> String {
    config::DEFAULT_FIRESTORE_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    config::DEFAULT_TOKEN_ENDPOINT.to_string()
}

impl Default for FirebaseSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            auth_endpoint: default_auth_endpoint(),
            firestore_endpoint: default_firestore_endpoint(),
            token_endpoint: default_token_endpoint(),
        }
    }
}

/// Where accounts and records live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendSettings {
    /// Local SQLite database with local accounts
    #[default]
    Local,
    /// Firebase Authentication and Cloud Firestore
    Firebase(FirebaseSettings),
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    /// Collection holding student records
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Timeout for a single provider request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_collection() -> String {
    config::STUDENTS_COLLECTION.to_string()
}

fn default_request_timeout() -> u64 {
    config::DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            collection: default_collection(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AppSettings {
    /// Reject settings that cannot produce a working backend
    pub fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() || self.collection.contains('/') {
            return Err(AppError::Config(format!(
                "Invalid collection name: {:?}",
                self.collection
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let BackendSettings::Firebase(firebase) = &self.backend {
            if firebase.api_key.trim().is_empty() {
                return Err(AppError::Config("Firebase api_key is required".to_string()));
            }
            if firebase.project_id.trim().is_empty() {
                return Err(AppError::Config("Firebase project_id is required".to_string()));
            }
        }

        Ok(())
    }
}

/// Service for managing settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(config::SETTINGS_FILE),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }
}
