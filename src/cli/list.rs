//! `histkeep list` command implementation.

use crate::cli::open_backend;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::{HistoryBackend, SessionSummary};
use chrono::{DateTime, Local, Utc};
use glob::Pattern;

/// Default number of sessions to show.
const DEFAULT_LIMIT: usize = 20;

/// Run the list command.
///
/// Shows sessions with their IDs, last update time, and record count.
///
/// # Errors
///
/// Returns an error if the filter is not a valid glob or storage fails.
pub fn run(config: &Config, limit: Option<usize>, filter: Option<&str>) -> Result<()> {
    let backend = open_backend(config)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    let sessions = matching_sessions(&backend, limit, filter)?;

    if sessions.is_empty() {
        println!("No sessions found.");
        println!("\nSessions are stored in: {}", backend.sessions_dir().display());
        return Ok(());
    }

    println!("{:<38} {:<17} {:>7}  Last Record", "Session ID", "Updated", "Records");
    println!("{}", "─".repeat(90));

    for summary in &sessions {
        println!(
            "{:<38} {:<17} {:>7}  {}",
            summary.session_id,
            format_local_time(summary.updated_at),
            summary.record_count,
            summary.last_timestamp.as_deref().unwrap_or("(empty)")
        );
    }

    println!("{}", "─".repeat(90));
    println!("Showing {} session(s)", sessions.len());

    Ok(())
}

/// Sessions whose id matches `filter`, newest first, at most `limit`.
fn matching_sessions(
    backend: &dyn HistoryBackend,
    limit: usize,
    filter: Option<&str>,
) -> Result<Vec<SessionSummary>> {
    let Some(filter) = filter else {
        return backend.list_sessions(limit);
    };

    let pattern = Pattern::new(filter)
        .map_err(|e| Error::InvalidState(format!("Invalid filter {filter:?}: {e}")))?;

    let mut sessions = backend.list_sessions(usize::MAX)?;
    sessions.retain(|s| pattern.matches(&s.session_id));
    sessions.truncate(limit);
    Ok(sessions)
}

/// Format UTC time as local time for display.
fn format_local_time(utc: DateTime<Utc>) -> String {
    let local: DateTime<Local> = utc.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}
