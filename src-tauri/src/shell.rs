//! Router shell
//!
//! Route table and sidebar of the console. Every route except the login form
//! needs a session; the guard sends signed-out visitors to `/login`.

use crate::config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    #[serde(rename = "/login")]
    Login,
    #[serde(rename = "/")]
    Dashboard,
    #[serde(rename = "/students")]
    Students,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Students => "/students",
        }
    }

    /// Map a path onto a route; unknown paths land on the dashboard
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');

        match path {
            "/login" => Route::Login,
            "/students" => Route::Students,
            _ => Route::Dashboard,
        }
    }

    pub fn requires_session(self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Where a navigation actually ends up
pub fn resolve(requested: Route, signed_in: bool) -> Route {
    match (requested, signed_in) {
        (route, false) if route.requires_session() => Route::Login,
        (Route::Login, true) => Route::Students,
        (route, _) => route,
    }
}

/// Landing route after a successful sign-in
pub fn after_sign_in() -> Route {
    Route::Students
}

/// Landing route after signing out
pub fn after_sign_out() -> Route {
    Route::Login
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "route", rename_all = "camelCase")]
pub enum SidebarAction {
    Navigate(Route),
    SignOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub label: &'static str,
    pub action: SidebarAction,
}

/// Sidebar entries shown on the dashboard
pub fn sidebar() -> Vec<SidebarItem> {
    vec![
        SidebarItem {
            label: "Students Page",
            action: SidebarAction::Navigate(Route::Students),
        },
        SidebarItem {
            label: "Logout",
            action: SidebarAction::SignOut,
        },
    ]
}

/// Choices offered by the student form's select fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormOptions {
    pub sections: &'static [&'static str],
    pub grades: &'static [&'static str],
}

pub fn form_options() -> FormOptions {
    FormOptions {
        sections: config::SECTIONS,
        grades: config::GRADES,
    }
}
