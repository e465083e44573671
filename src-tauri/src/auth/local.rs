//! Local accounts provider
//!
//! Accounts live in the application database. Unknown emails and wrong
//! passwords fail with the same message.

use super::{check_credentials, describe_error_code, AuthProvider, Session, INVALID_LOGIN_CREDENTIALS};
use crate::config;
use crate::crypto;
use crate::database::{Account, Repository};
use crate::error::{AppError, Result};
use crate::validation;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LocalAuthProvider {
    repo: Repository,
}

impl LocalAuthProvider {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create an account with a freshly hashed password
    pub async fn create_account(&self, email: &str, password: &str) -> Result<Account> {
        let (email, phc) = prepare_account(email, password).await?;

        let account = self.repo.create_account(email, &phc).await?;
        tracing::info!("Created local account: {}", account.email);

        Ok(account)
    }

    /// Create the first account; refused once any account exists
    pub async fn create_first_account(&self, email: &str, password: &str) -> Result<Account> {
        let (email, phc) = prepare_account(email, password).await?;

        let account = self
            .repo
            .create_first_account(email, &phc)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("An account already exists; sign in instead".to_string())
            })?;
        tracing::info!("Created first local account: {}", account.email);

        Ok(account)
    }

    /// Whether any local account exists yet
    pub async fn has_accounts(&self) -> Result<bool> {
        Ok(self.repo.count_accounts().await? > 0)
    }
}

/// Check the email shape and password length, then hash the password
async fn prepare_account<'a>(email: &'a str, password: &str) -> Result<(&'a str, String)> {
    let email = email.trim();

    if !validation::is_email(email) {
        return Err(AppError::Generic(format!("Invalid email address: {}", email)));
    }
    if password.chars().count() < config::MIN_PASSWORD_LENGTH {
        return Err(AppError::Generic(format!(
            "Password must be at least {} characters",
            config::MIN_PASSWORD_LENGTH
        )));
    }

    let password = password.to_string();
    let phc = tokio::task::spawn_blocking(move || crypto::hash_password(&password))
        .await
        .map_err(|e| AppError::Generic(format!("Password hashing task failed: {}", e)))??;

    Ok((email, phc))
}

fn rejected() -> AppError {
    AppError::Auth(describe_error_code(INVALID_LOGIN_CREDENTIALS))
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        check_credentials(email, password)?;

        let Some(account) = self.repo.find_account_by_email(email.trim()).await? else {
            tracing::debug!("No local account for {}", email);
            return Err(rejected());
        };

        let password = password.to_string();
        let phc = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || crypto::verify_password(&password, &phc))
            .await
            .map_err(|e| AppError::Generic(format!("Password check task failed: {}", e)))??;

        if !verified {
            return Err(rejected());
        }

        Ok(Session {
            user_id: account.id,
            email: account.email,
            token: Uuid::new_v4().to_string(),
            refresh_token: None,
            expires_at: None,
            signed_in_at: Utc::now(),
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        tracing::debug!("Local session closed for {}", session.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;

    async fn create_test_provider() -> LocalAuthProvider {
        LocalAuthProvider::new(Repository::new(create_memory_pool().await.unwrap()))
    }

    #[tokio::test]
    async fn test_sign_in_with_created_account() {
        let provider = create_test_provider().await;
        assert!(!provider.has_accounts().await.unwrap());

        provider
            .create_account("admin@school.test", "s3cret-pass")
            .await
            .unwrap();
        assert!(provider.has_accounts().await.unwrap());

        let session = provider
            .sign_in(" Admin@School.test ", "s3cret-pass")
            .await
            .unwrap();
        assert_eq!(session.email, "admin@school.test");
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let provider = create_test_provider().await;
        provider
            .create_account("admin@school.test", "s3cret-pass")
            .await
            .unwrap();

        let wrong = provider.sign_in("admin@school.test", "nope").await.unwrap_err();
        let unknown = provider.sign_in("who@school.test", "nope").await.unwrap_err();

        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.to_string(), "Login failed. Invalid email or password.");
    }

    #[tokio::test]
    async fn test_create_account_rules() {
        let provider = create_test_provider().await;

        assert!(provider.create_account("not-an-email", "long-enough").await.is_err());
        assert!(provider.create_account("a@b.com", "short").await.is_err());
        assert!(!provider.has_accounts().await.unwrap());
    }
}
