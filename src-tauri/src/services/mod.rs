//! Services module
//!
//! Business logic services that coordinate between commands, providers and
//! stores.

pub mod console;
pub mod session;
pub mod settings;
pub mod students;

pub use console::{ConsoleMode, ConsoleView, DraftTarget, StudentsConsole, SubmitOutcome};
pub use session::SessionGate;
pub use settings::{AppSettings, BackendSettings, FirebaseSettings, SettingsService};
pub use students::StudentsService;
