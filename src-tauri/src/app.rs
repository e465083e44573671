//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! The configured backend is wired up here and made available through
//! AppState.

use crate::auth::{AuthProvider, FirebaseAuthProvider, LocalAuthProvider, Session, SessionHandle};
use crate::config;
use crate::database::{self, Account, Repository};
use crate::error::{AppError, Result};
use crate::services::{
    AppSettings, BackendSettings, SessionGate, SettingsService, StudentsConsole, StudentsService,
};
use crate::storage::{DocumentStore, FirestoreStore, LocalStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings: AppSettings,
    pub session: SessionGate,
    pub students: StudentsService,
    console: Arc<Mutex<StudentsConsole>>,
    /// Present only when accounts are local
    accounts: Option<LocalAuthProvider>,
}

impl AppState {
    /// Load settings and connect the configured backend
    pub async fn initialize(app_data_dir: PathBuf) -> Result<Self> {
        let settings = SettingsService::new(app_data_dir.clone()).load().await?;
        settings.validate()?;

        let handle = SessionHandle::default();

        let (provider, store, accounts): (
            Arc<dyn AuthProvider>,
            Arc<dyn DocumentStore>,
            Option<LocalAuthProvider>,
        ) = match &settings.backend {
            BackendSettings::Local => {
                tracing::info!("Using local accounts and document store");
                let db_path = app_data_dir.join(config::LOCAL_DATABASE_FILE);
                let repo = Repository::new(database::create_pool(&db_path).await?);
                let accounts = LocalAuthProvider::new(repo.clone());
                (
                    Arc::new(accounts.clone()),
                    Arc::new(LocalStore::new(repo)),
                    Some(accounts),
                )
            }
            BackendSettings::Firebase(firebase) => {
                tracing::info!("Using Firebase project {}", firebase.project_id);
                let client = reqwest::Client::builder()
                    .user_agent(config::USER_AGENT)
                    .timeout(Duration::from_secs(settings.request_timeout_secs))
                    .build()?;
                (
                    Arc::new(FirebaseAuthProvider::new(client.clone(), firebase)),
                    Arc::new(FirestoreStore::new(client, firebase, handle.clone())),
                    None,
                )
            }
        };

        Ok(Self::from_parts(app_data_dir, settings, provider, store, handle, accounts))
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        app_data_dir: PathBuf,
        settings: AppSettings,
        provider: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        handle: SessionHandle,
        accounts: Option<LocalAuthProvider>,
    ) -> Self {
        let students = StudentsService::new(store, settings.collection.clone());

        Self {
            app_data_dir,
            session: SessionGate::new(provider, handle),
            console: Arc::new(Mutex::new(StudentsConsole::new(students.clone()))),
            students,
            settings,
            accounts,
        }
    }

    /// Sign in; the console starts empty for the new session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let mut console = self.console.lock().await;
        let session = self.session.authenticate(email, password).await?;
        console.reset();
        Ok(session)
    }

    /// Sign out and discard the console's listing and draft.
    ///
    /// Takes the console lock first, so no console operation can be midway
    /// through a store call when the session ends.
    pub async fn sign_out(&self) -> Result<()> {
        let mut console = self.console.lock().await;
        console.reset();
        self.session.sign_out().await
    }

    /// Lock the console for the signed-in user
    pub async fn console(&self) -> Result<MutexGuard<'_, StudentsConsole>> {
        let console = self.console.lock().await;
        self.session.require().await?;
        Ok(console)
    }

    /// Whether a first local account still has to be created
    pub async fn needs_bootstrap(&self) -> Result<bool> {
        match &self.accounts {
            Some(accounts) => Ok(!accounts.has_accounts().await?),
            None => Ok(false),
        }
    }

    /// Create the first local account; refused once any account exists
    pub async fn create_first_account(&self, email: &str, password: &str) -> Result<Account> {
        let accounts = self.accounts.as_ref().ok_or_else(|| {
            AppError::InvalidState("Accounts are managed by the sign-in provider".to_string())
        })?;

        accounts.create_first_account(email, password).await
    }
}

/// Application setup - called once on startup
#[cfg(feature = "desktop")]
pub fn setup(app: &mut tauri::App) -> Result<()> {
    use tauri::Manager;

    tracing::info!("Initializing application");

    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| AppError::Generic(format!("Failed to get app data dir: {}", e)))?;

    tracing::info!("App data directory: {:?}", app_data_dir);
    std::fs::create_dir_all(&app_data_dir)?;

    let state = tauri::async_runtime::block_on(AppState::initialize(app_data_dir))?;
    app.manage(state);

    tracing::info!("Application initialized successfully");

    Ok(())
}
