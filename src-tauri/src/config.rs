//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the application.
//! Runtime (per-installation) settings live in `services::settings`.

// ===== Document Store =====

/// Collection holding student records
pub const STUDENTS_COLLECTION: &str = "students";

/// File name of the local document store inside the app data directory
pub const LOCAL_DATABASE_FILE: &str = "rollcall.db";

/// File name of the runtime settings inside the app data directory
pub const SETTINGS_FILE: &str = "settings.json";

// ===== Student Field Rules =====

/// Letters and spaces only (name, guardian name)
pub const PERSON_NAME_PATTERN: &str = r"^[A-Za-z ]+$";

/// Class 1 through 12
pub const CLASS_PATTERN: &str = r"^[1-9]$|^1[0-2]$";

/// Highest class accepted by the form; larger numeric input is clamped to it
pub const MAX_CLASS: u32 = 12;

/// Valid section letters
pub const SECTION_PATTERN: &str = r"^[A-E]$";

/// Roll number 1 through 100
pub const ROLL_NUMBER_PATTERN: &str = r"^[1-9][0-9]?$|^100$";

/// Maximum address length in characters
pub const MAX_ADDRESS_LENGTH: usize = 100;

/// Exactly ten digits
pub const PHONE_PATTERN: &str = r"^[0-9]{10}$";

/// Basic `local@domain.tld` shape
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Valid grade letters
pub const GRADE_PATTERN: &str = r"^[A-F]$";

/// Minimum age in whole calendar years at admission.
/// Kept as observed in the records this console was built for; whether it is
/// an enrolment policy has not been confirmed.
pub const MIN_ADMISSION_AGE_YEARS: i32 = 4;

/// Date format used by the form for date of birth and admission date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Section choices offered by the form
pub const SECTIONS: &[&str] = &["A", "B", "C", "D", "E"];

/// Grade choices offered by the form
pub const GRADES: &[&str] = &["A", "B", "C", "D", "E", "F"];

// ===== Remote Providers =====

/// Default Firebase Authentication REST endpoint
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default Cloud Firestore REST endpoint
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Default Secure Token endpoint used to refresh Firebase ID tokens
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1";

/// ID tokens this close to expiry are refreshed before use
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Default timeout for a single provider request in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size requested when listing a Firestore collection
pub const FIRESTORE_PAGE_SIZE: u32 = 300;

/// User agent sent with provider requests
pub const USER_AGENT: &str = concat!("Rollcall/", env!("CARGO_PKG_VERSION"));

// ===== Local Accounts =====

/// Minimum password length accepted when creating a local account
pub const MIN_PASSWORD_LENGTH: usize = 8;
