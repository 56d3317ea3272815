//! Session identifier lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::storage::KeyValueStorage;

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "session_id";

/// Opaque identifier correlating this client with server-side memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owns the session identifier for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct SessionManager {
    session_id: SessionId,
}

impl SessionManager {
    /// Load the stored identifier, or generate and persist a new one.
    ///
    /// Never fails. An unreadable store is treated as empty, and an unwritable
    /// store leaves the new identifier usable for this process only.
    pub fn initialize(storage: &dyn KeyValueStorage) -> Self {
        let stored = storage.get(SESSION_KEY).unwrap_or_else(|e| {
            warn!(name: "session.storage.read_failed", error = %e, "Could not read session storage");
            None
        });

        if let Some(existing) = stored.filter(|s| !s.trim().is_empty()) {
            info!(name: "session.restored", session_id = %existing, "Session restored");
            return Self {
                session_id: SessionId(existing),
            };
        }

        let session_id = SessionId::generate();
        match storage.set(SESSION_KEY, session_id.as_str()) {
            Ok(()) => {
                info!(name: "session.created", session_id = %session_id, "Session created");
            }
            Err(e) => {
                warn!(
                    name: "session.storage.write_failed",
                    session_id = %session_id,
                    error = %e,
                    "Session identifier will not survive a restart"
                );
            }
        }

        Self { session_id }
    }

    /// Get the current session identifier.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}
