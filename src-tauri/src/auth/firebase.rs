//! Firebase Authentication provider
//!
//! Email/password sign-in through the Identity Toolkit REST API
//! (`accounts:signInWithPassword`). ID tokens last about an hour and are
//! renewed through the Secure Token API with the session's refresh token.
//! Sign-out only drops the tokens; they cannot be revoked from the client.

use super::{check_credentials, describe_error_code, AuthProvider, Session};
use crate::error::{AppError, Result};
use crate::services::settings::FirebaseSettings;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

/// Secure Token API answer; unlike sign-in it uses snake_case keys
#[derive(Deserialize, Debug)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Expiry instant from a lifetime given in seconds as text
fn expiry(issued_at: DateTime<Utc>, expires_in: Option<&str>) -> Option<DateTime<Utc>> {
    let seconds = expires_in?.trim().parse::<i64>().ok()?;
    Some(issued_at + Duration::seconds(seconds))
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct FirebaseAuthProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl FirebaseAuthProvider {
    pub fn new(client: reqwest::Client, settings: &FirebaseSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            endpoint: settings.auth_endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn sign_in_url(&self) -> String {
        format!("{}/accounts:signInWithPassword", self.endpoint)
    }
}

/// Exchange the session's refresh token for a fresh ID token
pub async fn refresh_session(
    client: &reqwest::Client,
    token_endpoint: &str,
    api_key: &str,
    session: &Session,
) -> Result<Session> {
    let refresh_token = session
        .refresh_token
        .as_deref()
        .ok_or(AppError::NotAuthenticated)?;

    tracing::debug!("Refreshing Firebase ID token for {}", session.email);

    let response = client
        .post(format!("{}/token", token_endpoint.trim_end_matches('/')))
        .query(&[("key", api_key)])
        .json(&RefreshRequest {
            grant_type: "refresh_token",
            refresh_token,
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let code = error_code(&body).unwrap_or_else(|| status.to_string());
        tracing::warn!("Firebase token refresh rejected ({}): {}", status, code);
        return Err(AppError::Auth(describe_error_code(&code)));
    }

    let body: RefreshResponse = response.json().await?;
    Ok(refreshed(session, body, Utc::now()))
}

fn refreshed(session: &Session, body: RefreshResponse, now: DateTime<Utc>) -> Session {
    Session {
        token: body.id_token,
        refresh_token: Some(body.refresh_token),
        expires_at: expiry(now, body.expires_in.as_deref()),
        ..session.clone()
    }
}

/// Extract the provider's error code from a failed response body
fn error_code(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
}

#[async_trait]
impl AuthProvider for FirebaseAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        check_credentials(email, password)?;

        let email = email.trim();
        tracing::info!("Signing in {} with Firebase Authentication", email);

        let response = self
            .client
            .post(self.sign_in_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Could not reach the sign-in service: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = error_code(&body).unwrap_or_else(|| status.to_string());
            tracing::warn!("Firebase sign-in rejected ({}): {}", status, code);
            return Err(AppError::Auth(describe_error_code(&code)));
        }

        let body: SignInResponse = response.json().await?;
        let now = Utc::now();

        Ok(Session {
            user_id: body.local_id,
            email: body.email,
            token: body.id_token,
            expires_at: expiry(now, body.expires_in.as_deref()),
            refresh_token: body.refresh_token,
            signed_in_at: now,
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        tracing::debug!("Discarding Firebase ID token for {}", session.email);
        Ok(())
    }
}
