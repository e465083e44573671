//! Session gate
//!
//! Holds the single active session and delegates credential checks to the
//! configured [`AuthProvider`]. A failed sign-in leaves the current state
//! untouched.

use crate::auth::{AuthProvider, Session, SessionHandle};
use crate::error::{AppError, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionGate {
    provider: Arc<dyn AuthProvider>,
    current: SessionHandle,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn AuthProvider>, current: SessionHandle) -> Self {
        Self { provider, current }
    }

    /// Sign in and make the returned session current
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();

        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                tracing::info!("Signed in as {}", session.email);
                *self.current.write().await = Some(session.clone());
                Ok(session)
            }
            Err(e) => {
                tracing::warn!("Sign-in failed for {}: {}", email, e);
                Err(e)
            }
        }
    }

    /// End the current session, if any
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.current.write().await.take() else {
            return Ok(());
        };

        self.provider.sign_out(&session).await?;
        tracing::info!("Signed out {}", session.email);

        Ok(())
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// The current session, or `NotAuthenticated`
    pub async fn require(&self) -> Result<Session> {
        self.current().await.ok_or(AppError::NotAuthenticated)
    }

    /// Shared handle read by providers that attach the session token
    pub fn handle(&self) -> SessionHandle {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalAuthProvider;
    use crate::database::{create_memory_pool, Repository};

    async fn create_test_gate() -> SessionGate {
        let provider = LocalAuthProvider::new(Repository::new(create_memory_pool().await.unwrap()));
        provider
            .create_account("office@school.test", "front-desk-1")
            .await
            .unwrap();

        SessionGate::new(Arc::new(provider), SessionHandle::default())
    }

    #[tokio::test]
    async fn test_authenticate_sets_current_session() {
        let gate = create_test_gate().await;
        assert!(!gate.is_signed_in().await);
        assert!(matches!(gate.require().await, Err(AppError::NotAuthenticated)));

        let session = gate
            .authenticate("office@school.test", "front-desk-1")
            .await
            .unwrap();

        assert_eq!(gate.require().await.unwrap(), session);
        assert_eq!(gate.handle().read().await.as_ref(), Some(&session));
    }

    #[tokio::test]
    async fn test_failed_sign_in_stays_put() {
        let gate = create_test_gate().await;

        let err = gate
            .authenticate("office@school.test", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Auth(_)));
        assert!(!gate.is_signed_in().await);
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_existing_session() {
        let gate = create_test_gate().await;
        let session = gate
            .authenticate("office@school.test", "front-desk-1")
            .await
            .unwrap();

        assert!(gate.authenticate("office@school.test", "wrong").await.is_err());
        assert_eq!(gate.current().await, Some(session));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let gate = create_test_gate().await;
        gate.authenticate("office@school.test", "front-desk-1")
            .await
            .unwrap();

        gate.sign_out().await.unwrap();
        assert!(gate.current().await.is_none());

        // Signing out twice is harmless
        gate.sign_out().await.unwrap();
    }
}
