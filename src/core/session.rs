//! Assistant sessions: one bounded history plus the persistence around it.
//!
//! A [`Session`] is what each assistant wrapper owns. Persistence failures are
//! logged and returned; the in-memory history stays usable either way.

use crate::core::history::BoundedHistoryStore;
use crate::core::record::{HistoryRecord, RecordKind, Role};
use crate::error::Result;
use crate::storage::HistoryBackend;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error};

/// A message as sent to a chat provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Role name (`system`, `user`, `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

/// An assistant session owning its own history.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    history: BoundedHistoryStore,
}

impl Session {
    /// Create a session with an empty history.
    #[must_use]
    pub fn new(id: impl Into<String>, max_length: usize) -> Self {
        Self {
            id: id.into(),
            history: BoundedHistoryStore::new(max_length),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session's history.
    #[must_use]
    pub fn history(&self) -> &BoundedHistoryStore {
        &self.history
    }

    /// Append a typed record stamped with the current time.
    pub fn record(&mut self, kind: RecordKind) -> HistoryRecord {
        self.record_raw(kind.into_record())
    }

    /// Append an arbitrary record.
    pub fn record_raw(&mut self, record: HistoryRecord) -> HistoryRecord {
        self.history.append(record.clone());
        record
    }

    /// Messages for a chat provider call.
    ///
    /// The optional system prompt comes first, followed by every record that
    /// carries a known chat role and text content, oldest first.
    #[must_use]
    pub fn chat_context(&self, system_prompt: Option<&str>) -> Vec<ChatMessage> {
        let system = system_prompt.map(|prompt| ChatMessage {
            role: Role::System.to_string(),
            content: prompt.to_string(),
        });

        let turns = self.history.iter().filter_map(|record| {
            let role = Role::parse(record.get_str("role")?)?;
            let content = record.get_str("content")?;
            Some(ChatMessage {
                role: role.to_string(),
                content: content.to_string(),
            })
        });

        system.into_iter().chain(turns).collect()
    }

    /// Clear the history.
    pub fn clear(&mut self) {
        self.history.reset();
    }

    /// Persist the history through `backend`.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it.
    pub fn save(&self, backend: &dyn HistoryBackend) -> Result<()> {
        backend
            .put_history(&self.id, &self.history.snapshot())
            .inspect_err(|e| error!(session = %self.id, error = %e, "failed to save history"))?;
        debug!(session = %self.id, records = self.history.len(), "history saved");
        Ok(())
    }

    /// Load the history from `backend`, replacing the in-memory one.
    ///
    /// Returns `false`, leaving the history untouched, if the backend has no
    /// such session.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it. The history is untouched.
    pub fn load(&mut self, backend: &dyn HistoryBackend) -> Result<bool> {
        let stored = backend
            .get_history(&self.id)
            .inspect_err(|e| error!(session = %self.id, error = %e, "failed to load history"))?;

        match stored {
            Some(records) => {
                self.history.replace(records);
                debug!(session = %self.id, records = self.history.len(), "history loaded");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write the history to an arbitrary file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoWrite`](crate::error::Error::IoWrite) after logging it.
    pub fn export(&self, path: &Path) -> Result<()> {
        self.history
            .serialize(path)
            .inspect_err(|e| error!(session = %self.id, error = %e, "export failed"))
    }

    /// Replace the history with the contents of a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoRead`](crate::error::Error::IoRead) after logging it.
    /// The history is untouched on failure.
    pub fn import(&mut self, path: &Path) -> Result<()> {
        self.history
            .restore(path)
            .inspect_err(|e| error!(session = %self.id, error = %e, "import failed"))
    }
}

/// Default dump file name, e.g. `conversation_20240131_235959.json`.
#[must_use]
pub fn default_export_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{prefix}_{}.json", now.format("%Y%m%d_%H%M%S"))
}
