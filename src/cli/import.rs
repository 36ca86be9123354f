//! `histkeep import` command implementation.

use crate::cli::open_backend;
use crate::config::Config;
use crate::core::Session;
use crate::error::Result;
use crate::storage::HistoryBackend;
use std::path::Path;

/// Run the import command.
///
/// Replaces the session's history with the JSON array at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or storage fails.
pub fn run(config: &Config, session_id: &str, path: &Path) -> Result<()> {
    let backend = open_backend(config)?;
    let count = import_session(&backend, session_id, path, config.history.max_length)?;
    println!("Imported {count} record(s) into {session_id}");
    Ok(())
}

/// Restore from `path` and persist. The stored session is untouched on failure.
fn import_session(
    backend: &dyn HistoryBackend,
    session_id: &str,
    path: &Path,
    max_length: usize,
) -> Result<usize> {
    let mut session = Session::new(session_id, max_length);
    session.import(path)?;
    session.save(backend)?;
    Ok(session.history().len())
}
