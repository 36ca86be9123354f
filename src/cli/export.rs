//! `histkeep export` command implementation.

use crate::cli::open_backend;
use crate::config::Config;
use crate::core::{Session, default_export_name};
use crate::error::{Error, Result};
use crate::storage::HistoryBackend;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Run the export command.
///
/// Writes the session's history to `path`, or to a timestamped
/// `conversation_*.json` in the current directory.
///
/// # Errors
///
/// Returns an error if the session is not found or the file cannot be written.
pub fn run(config: &Config, session_id: &str, path: Option<&Path>) -> Result<()> {
    let backend = open_backend(config)?;
    let path = path.map_or_else(
        || PathBuf::from(default_export_name("conversation", Local::now())),
        Path::to_path_buf,
    );

    let count = export_session(&backend, session_id, &path, config.history.max_length)?;
    println!("Exported {count} record(s) to {}", path.display());
    Ok(())
}

/// Load the session and serialize it to `path`.
fn export_session(
    backend: &dyn HistoryBackend,
    session_id: &str,
    path: &Path,
    max_length: usize,
) -> Result<usize> {
    let mut session = Session::new(session_id, max_length);
    if !session.load(backend)? {
        return Err(Error::SessionNotFound(session_id.to_string()));
    }
    session.export(path)?;
    Ok(session.history().len())
}
