//! Students console commands
//!
//! Each command returns the console snapshot so the frontend can re-render
//! from a single source. Successful writes also emit `students-changed`.

use crate::app::AppState;
use crate::error::Result;
use crate::services::{ConsoleView, SubmitOutcome};
use crate::student::StudentField;
use tauri::{AppHandle, Emitter, State};

/// Event emitted after a student is created, updated or deleted
pub const STUDENTS_CHANGED_EVENT: &str = "students-changed";

/// Submit result plus the console snapshot
#[derive(serde::Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    pub view: ConsoleView,
}

fn notify_changed(app: &AppHandle) {
    if let Err(e) = app.emit(STUDENTS_CHANGED_EVENT, ()) {
        tracing::warn!("Failed to emit {}: {}", STUDENTS_CHANGED_EVENT, e);
    }
}

/// Fetch every student and return the listing
#[tauri::command]
pub async fn load_students(state: State<'_, AppState>) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.reload().await?;
    Ok(console.view())
}

/// Current console snapshot without contacting the store
#[tauri::command]
pub async fn console_view(state: State<'_, AppState>) -> Result<ConsoleView> {
    Ok(state.console().await?.view())
}

/// Open a blank draft
#[tauri::command]
pub async fn begin_add(state: State<'_, AppState>) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.begin_add();
    Ok(console.view())
}

/// Open a draft copied from a listed student
#[tauri::command]
pub async fn begin_edit(state: State<'_, AppState>, id: String) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.begin_edit(&id)?;
    Ok(console.view())
}

/// Change one field of the open draft
#[tauri::command]
pub async fn set_draft_field(
    state: State<'_, AppState>,
    field: StudentField,
    value: String,
) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.set_field(field, value)?;
    Ok(console.view())
}

/// Close the draft without saving
#[tauri::command]
pub async fn cancel_draft(state: State<'_, AppState>) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.cancel_draft();
    Ok(console.view())
}

/// Validate and save the open draft
#[tauri::command]
pub async fn submit_draft(app: AppHandle, state: State<'_, AppState>) -> Result<SubmitResponse> {
    let mut console = state.console().await?;
    let outcome = console.submit().await?;

    if let SubmitOutcome::Saved { id } = &outcome {
        tracing::info!("Saved student {}", id);
        notify_changed(&app);
    }

    Ok(SubmitResponse {
        outcome,
        view: console.view(),
    })
}

/// Show a read-only copy of a student
#[tauri::command]
pub async fn view_student(state: State<'_, AppState>, id: String) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.open_view(&id)?;
    Ok(console.view())
}

/// Close the read-only view
#[tauri::command]
pub async fn close_view(state: State<'_, AppState>) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.close_view()?;
    Ok(console.view())
}

/// Delete a student and return the refreshed listing
#[tauri::command]
pub async fn delete_student(
    app: AppHandle,
    state: State<'_, AppState>,
    id: String,
) -> Result<ConsoleView> {
    let mut console = state.console().await?;
    console.delete(&id).await?;
    notify_changed(&app);
    Ok(console.view())
}
