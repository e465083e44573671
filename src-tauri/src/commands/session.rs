//! Session and routing commands

use crate::app::AppState;
use crate::auth::Session;
use crate::database::Account;
use crate::error::Result;
use crate::shell::{self, FormOptions, Route, SidebarItem};
use tauri::State;

/// Outcome of a sign-in: the session and where to go next
#[derive(serde::Serialize)]
pub struct SignedIn {
    pub session: Session,
    pub route: Route,
}

/// Sign in with email and password
#[tauri::command]
pub async fn sign_in(
    state: State<'_, AppState>,
    email: String,
    password: String,
) -> Result<SignedIn> {
    let session = state.sign_in(&email, &password).await?;

    Ok(SignedIn {
        session,
        route: shell::after_sign_in(),
    })
}

/// Sign out and return the route to show
#[tauri::command]
pub async fn sign_out(state: State<'_, AppState>) -> Result<Route> {
    state.sign_out().await?;
    Ok(shell::after_sign_out())
}

/// Current session, if signed in
#[tauri::command]
pub async fn current_session(state: State<'_, AppState>) -> Result<Option<Session>> {
    Ok(state.session.current().await)
}

/// Whether the login form should offer to create the first account
#[tauri::command]
pub async fn needs_bootstrap(state: State<'_, AppState>) -> Result<bool> {
    state.needs_bootstrap().await
}

/// Create the first local account
#[tauri::command]
pub async fn create_first_account(
    state: State<'_, AppState>,
    email: String,
    password: String,
) -> Result<Account> {
    state.create_first_account(&email, &password).await
}

/// Resolve a requested path through the session guard
#[tauri::command]
pub async fn navigate(state: State<'_, AppState>, path: String) -> Result<Route> {
    let requested = Route::from_path(&path);
    let route = shell::resolve(requested, state.session.is_signed_in().await);

    if route != requested {
        tracing::debug!("Navigation to {} redirected to {}", path, route.path());
    }

    Ok(route)
}

/// Sidebar entries
#[tauri::command]
pub fn sidebar_items() -> Vec<SidebarItem> {
    shell::sidebar()
}

/// Section and grade choices for the student form
#[tauri::command]
pub fn form_options() -> FormOptions {
    shell::form_options()
}
