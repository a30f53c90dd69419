//! Persisted auth session
//!
//! The session lives in a JSON file under `.cache/`; login, signup,
//! logout, profile updates and account deletion all write through
//! `SessionStore`, which persists first and then broadcasts a single
//! change notification on the [`AuthEventBus`].

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bus::AuthEventBus;

pub const DEFAULT_SESSION_FILE: &str = ".cache/session.json";
pub const TOKEN_ENV: &str = "SERENITY_TOKEN";
pub const USER_ENV: &str = "SERENITY_USER";

/// Whether a user is signed in in this process, and as whom
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub display_name: String,
}

/// Owns the well-known session slot. Any component may read it; only the
/// auth flows write it, and every write publishes exactly one bus
/// notification after the file hits disk.
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
    bus: AuthEventBus,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, bus: AuthEventBus) -> Self {
        Self { path: path.into(), bus }
    }

    /// Establish or touch up the session from `SERENITY_TOKEN` /
    /// `SERENITY_USER`, standing in for an interactive sign-in flow.
    /// Both set means sign in; only the user name set renames the
    /// profile on an existing session. Returns whether anything changed.
    pub fn login_from_env(&self) -> Result<bool> {
        let token = std::env::var(TOKEN_ENV).ok();
        let user = std::env::var(USER_ENV).ok();
        match (token, user) {
            (Some(token), Some(display_name)) => {
                self.login(&AuthSession { token, display_name })?;
                Ok(true)
            }
            (None, Some(display_name)) if self.read().is_some() => {
                self.update_profile(&display_name)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Re-read the persisted session. Absent or unreadable files mean
    /// signed out; corruption is logged, not surfaced.
    pub fn read(&self) -> Option<AuthSession> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    /// Persist a freshly issued session (login or signup success).
    pub fn login(&self, session: &AuthSession) -> Result<()> {
        self.write(session)?;
        tracing::info!(user = %session.display_name, "Session established");
        self.bus.publish();
        Ok(())
    }

    /// Change the display name on the current session.
    pub fn update_profile(&self, display_name: &str) -> Result<()> {
        let Some(mut session) = self.read() else {
            anyhow::bail!("no active session to update");
        };
        session.display_name = display_name.to_string();
        self.write(&session)?;
        self.bus.publish();
        Ok(())
    }

    /// Destroy the session (logout or account deletion).
    pub fn logout(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("removing session file {}", self.path.display()))?;
        }
        tracing::info!("Session cleared");
        self.bus.publish();
        Ok(())
    }

    fn write(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating session directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing session file {}", self.path.display()))?;
        Ok(())
    }
}
