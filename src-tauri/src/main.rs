// Rollcall - student records console
// Entry point and application setup

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use rollcall::{app, commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rollcall");

    tauri::Builder::default()
        .setup(|app| {
            tracing::info!("Running app setup");
            app::setup(app)?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_app_info,
            commands::sign_in,
            commands::sign_out,
            commands::current_session,
            commands::needs_bootstrap,
            commands::create_first_account,
            commands::navigate,
            commands::sidebar_items,
            commands::form_options,
            commands::load_students,
            commands::console_view,
            commands::begin_add,
            commands::begin_edit,
            commands::set_draft_field,
            commands::cancel_draft,
            commands::submit_draft,
            commands::view_student,
            commands::close_view,
            commands::delete_student,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
