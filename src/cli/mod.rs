//! CLI command implementations.

pub mod clean;
pub mod export;
pub mod import;
pub mod list;
pub mod new;
pub mod record;
pub mod reset;
pub mod show;
pub mod stats;

use crate::config::Config;
use crate::core::HistoryRecord;
use crate::error::{Error, Result};
use crate::storage::{FileBackend, HistoryBackend};

/// Open the file backend rooted at the configured storage path.
///
/// # Errors
///
/// Returns an error if the sessions directory cannot be created.
pub fn open_backend(config: &Config) -> Result<FileBackend> {
    FileBackend::new(config.storage.path.clone())
}

/// Fetch a session's records, failing if it does not exist.
///
/// # Errors
///
/// Returns [`Error::SessionNotFound`] for unknown sessions, or the backend
/// error.
pub fn require_history(
    backend: &dyn HistoryBackend,
    session_id: &str,
) -> Result<Vec<HistoryRecord>> {
    backend
        .get_history(session_id)?
        .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
}
