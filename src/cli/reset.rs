//! `histkeep reset` command implementation.

use crate::cli::{open_backend, require_history};
use crate::config::Config;
use crate::error::Result;
use crate::storage::HistoryBackend;

/// Run the reset command.
///
/// Empties an existing session's history.
///
/// # Errors
///
/// Returns an error if the session is not found or storage fails.
pub fn run(config: &Config, session_id: &str) -> Result<()> {
    let backend = open_backend(config)?;
    let cleared = reset_session(&backend, session_id)?;
    println!("Cleared {cleared} record(s) from {session_id}.");
    Ok(())
}

/// Replace the stored history with an empty one; returns how many went.
fn reset_session(backend: &dyn HistoryBackend, session_id: &str) -> Result<usize> {
    let records = require_history(backend, session_id)?;
    backend.put_history(session_id, &[])?;
    Ok(records.len())
}
