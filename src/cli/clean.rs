//! `histkeep clean` command implementation.

use crate::cli::open_backend;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::HistoryBackend;
use chrono::{Duration, Utc};
use tracing::debug;

/// Run the clean command.
///
/// Removes sessions not updated within `before`, or within the configured
/// retention when `before` is not given.
///
/// # Errors
///
/// Returns an error if the duration is invalid or the storage backend fails.
pub fn run(config: &Config, before: Option<&str>, all: bool) -> Result<()> {
    let backend = open_backend(config)?;

    let duration = if all {
        Duration::zero()
    } else {
        match before {
            Some(before) => parse_duration(before)?,
            None => Duration::days(i64::from(config.cleanup.retention_days)),
        }
    };

    let removed = clean_sessions(&backend, duration)?;

    if removed == 0 {
        println!("No sessions to clean.");
    } else {
        println!("Cleaned {removed} session(s).");
    }

    Ok(())
}

/// Parse a duration string like "7d", "30d", "24h".
///
/// # Errors
///
/// Returns an error if the duration format is invalid.
fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if s.is_empty() {
        return Ok(Duration::days(7));
    }

    let parse_err = |_| Error::InvalidState(format!("Invalid duration: {s}"));

    let (digits, unit): (&str, fn(i64) -> Duration) = if let Some(n) = s.strip_suffix('d') {
        (n, Duration::days)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, Duration::hours)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, Duration::minutes)
    } else {
        // Bare number means days
        (s, Duration::days)
    };

    let num: i64 = digits.parse().map_err(parse_err)?;
    if num < 0 {
        return Err(Error::InvalidState(format!("Invalid duration: {s}")));
    }
    Ok(unit(num))
}

/// Delete sessions last updated before `now - before`.
fn clean_sessions(backend: &dyn HistoryBackend, before: Duration) -> Result<usize> {
    let cutoff = Utc::now() - before;
    let sessions = backend.list_sessions(usize::MAX)?;
    let mut removed = 0;

    for summary in sessions {
        if summary.updated_at > cutoff {
            continue;
        }

        debug!(session_id = %summary.session_id, "removing stale session");
        backend.delete_session(&summary.session_id)?;
        removed += 1;
    }

    Ok(removed)
}
