//! Storage trait definitions.

use crate::core::HistoryRecord;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Storage backend for session histories.
///
/// Backends are plain instances owned by the caller; each session id maps to
/// one independent history.
pub trait HistoryBackend: Send + Sync {
    /// Get a session's records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_history(&self, session_id: &str) -> Result<Option<Vec<HistoryRecord>>>;

    /// Save a session's records, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn put_history(&self, session_id: &str, records: &[HistoryRecord]) -> Result<()>;

    /// List sessions, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>>;

    /// Delete a session. Deleting an unknown session succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete_session(&self, session_id: &str) -> Result<()>;
}

/// Summary information for a session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Session identifier.
    pub session_id: String,

    /// Number of records stored.
    pub record_count: usize,

    /// Timestamp of the oldest record (if any).
    pub first_timestamp: Option<String>,

    /// Timestamp of the newest record (if any).
    pub last_timestamp: Option<String>,

    /// When the session was last written.
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Summarize `records` last written at `updated_at`.
    #[must_use]
    pub fn from_records(
        session_id: &str,
        records: &[HistoryRecord],
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            record_count: records.len(),
            first_timestamp: records.first().map(|r| r.timestamp.clone()),
            last_timestamp: records.last().map(|r| r.timestamp.clone()),
            updated_at,
        }
    }
}

/// Check that a session id is safe to use as a file stem.
///
/// Allowed: ASCII alphanumerics, `-`, `_` and `.`, not starting with `.`.
///
/// # Errors
///
/// Returns [`Error::InvalidSessionId`] otherwise.
pub fn validate_session_id(session_id: &str) -> Result<()> {
    let valid = !session_id.is_empty()
        && !session_id.starts_with('.')
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidSessionId(session_id.to_string()))
    }
}
