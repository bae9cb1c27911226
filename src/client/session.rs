//! Session persistence.
//!
//! A session is the cookie set of an authenticated browser login, reused
//! across runs so investigations can access what the logged-in account can
//! see. Stored as a single JSON file under the session directory; missing or
//! corrupt files degrade to anonymous access.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Session file name inside the session directory.
const SESSION_FILENAME: &str = "session.json";

/// Cookie that marks a session as authenticated.
const AUTH_COOKIE: &str = "sessionid";

/// A saved platform session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Account the session belongs to, if known.
    #[serde(default)]
    pub username: Option<String>,
    /// Cookie name/value pairs for the platform domain.
    pub cookies: HashMap<String, String>,
    /// When the session was saved.
    pub saved_at: DateTime<Utc>,
}

impl Session {
    /// Create a session from a cookie map.
    pub fn new(username: Option<String>, cookies: HashMap<String, String>) -> Self {
        Self {
            username,
            cookies,
            saved_at: Utc::now(),
        }
    }

    /// True when the session carries an authentication cookie.
    pub fn is_authenticated(&self) -> bool {
        self.cookies
            .get(AUTH_COOKIE)
            .is_some_and(|v| !v.is_empty())
    }
}

/// Loads and saves the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at the given session directory.
    pub fn new(session_dir: &Path) -> Self {
        Self {
            path: session_dir.join(SESSION_FILENAME),
        }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when a session file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the saved session, if any. Unreadable or malformed files are
    /// logged and treated as absent.
    pub fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                info!(
                    "Loaded session{} saved at {}",
                    session
                        .username
                        .as_deref()
                        .map(|u| format!(" for {}", u))
                        .unwrap_or_default(),
                    session.saved_at
                );
                Some(session)
            }
            Err(e) => {
                warn!("Ignoring malformed session file: {}", e);
                None
            }
        }
    }

    /// Save a session, creating the session directory if needed.
    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        info!("Session saved to {}", self.path.display());
        Ok(())
    }
}
