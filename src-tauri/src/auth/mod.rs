//! Sign-in providers
//!
//! The session gate delegates credential checks to an [`AuthProvider`]:
//! - `local`: accounts in the local database with Argon2 password hashes
//! - `firebase`: Firebase Authentication over its REST API

pub mod firebase;
pub mod local;

pub use firebase::FirebaseAuthProvider;
pub use local::LocalAuthProvider;

use crate::config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Authenticated context returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    /// Opaque bearer token; kept in memory only and never sent to the frontend
    #[serde(skip_serializing)]
    pub token: String,
    /// Used to obtain a new `token` once it expires
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// When `token` stops being accepted; `None` if it never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    /// Whether the token is expired or about to expire at `now`
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.refresh_token, self.expires_at) {
            (Some(_), Some(expires_at)) => {
                expires_at - Duration::seconds(config::TOKEN_REFRESH_MARGIN_SECS) <= now
            }
            _ => false,
        }
    }
}

/// Current session, shared between the gate and providers that need a token
pub type SessionHandle = Arc<RwLock<Option<Session>>>;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Check credentials and open a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Close a session previously returned by `sign_in`
    async fn sign_out(&self, session: &Session) -> Result<()>;
}

// Provider error codes, shared by both adapters
pub const INVALID_LOGIN_CREDENTIALS: &str = "INVALID_LOGIN_CREDENTIALS";
pub const MISSING_EMAIL: &str = "MISSING_EMAIL";
pub const MISSING_PASSWORD: &str = "MISSING_PASSWORD";

/// Turn a provider error code into the message shown on the login form
pub fn describe_error_code(code: &str) -> String {
    // Firebase appends detail after " : " for some codes
    let code = code.split(" : ").next().unwrap_or(code).trim();

    match code {
        INVALID_LOGIN_CREDENTIALS | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            "Invalid email or password.".to_string()
        }
        MISSING_EMAIL => "Enter an email address.".to_string(),
        MISSING_PASSWORD => "Enter a password.".to_string(),
        "INVALID_EMAIL" => "The email address is badly formatted.".to_string(),
        "USER_DISABLED" => "This account has been disabled.".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            "Too many failed attempts. Try again later.".to_string()
        }
        other => other.to_string(),
    }
}

/// Reject empty credentials before contacting a provider
pub(crate) fn check_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AppError::Auth(describe_error_code(MISSING_EMAIL)));
    }
    if password.is_empty() {
        return Err(AppError::Auth(describe_error_code(MISSING_PASSWORD)));
    }
    Ok(())
}
