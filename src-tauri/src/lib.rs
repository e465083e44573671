//! Rollcall library
//!
//! Student records console: sign-in, the students listing and its
//! add/edit/view/delete flows over a pluggable document store. The desktop
//! shell and its commands are behind the `desktop` feature.

pub mod app;
pub mod auth;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod services;
pub mod shell;
pub mod storage;
pub mod student;
pub mod validation;
