//! `histkeep record` command implementation.

use crate::cli::open_backend;
use crate::config::Config;
use crate::core::{RecordKind, Role, Session};
use crate::error::{Error, Result};
use crate::storage::HistoryBackend;

/// Run the record command.
///
/// Appends a chat turn to the session, creating the session if needed.
///
/// # Errors
///
/// Returns an error if the role or a field is invalid, or storage fails.
pub fn run(
    config: &Config,
    session_id: &str,
    role: &str,
    content: &str,
    fields: &[String],
    max_length: Option<usize>,
) -> Result<()> {
    let backend = open_backend(config)?;
    let max_length = max_length.unwrap_or(config.history.max_length);

    let session = append_turn(&backend, session_id, role, content, fields, max_length)?;

    println!(
        "Recorded {role} turn in {session_id} ({}/{} records)",
        session.history().len(),
        session.history().max_length()
    );
    Ok(())
}

/// Load the session, append one chat turn and save it back.
fn append_turn(
    backend: &dyn HistoryBackend,
    session_id: &str,
    role: &str,
    content: &str,
    fields: &[String],
    max_length: usize,
) -> Result<Session> {
    let role =
        Role::parse(role).ok_or_else(|| Error::InvalidState(format!("Invalid role: {role}")))?;

    let mut record = RecordKind::chat(role, content).into_record();
    for field in fields {
        let (key, value) = parse_field(field)?;
        record.insert(key, value);
    }

    let mut session = Session::new(session_id, max_length);
    session.load(backend)?;
    session.record_raw(record);
    session.save(backend)?;
    Ok(session)
}

/// Split `key=value`. The key must be non-empty.
fn parse_field(field: &str) -> Result<(&str, &str)> {
    match field.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(Error::InvalidState(format!(
            "Invalid field {field:?}, expected key=value"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HistoryRecord;
    use crate::storage::MemoryBackend;

    #[test]
    fn append_creates_session() {
        let backend = MemoryBackend::new();
        append_turn(&backend, "chat", "user", "hello", &[], 10).unwrap();

        let records = backend.get_history("chat").unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role_or_kind(), Some("user"));
        assert_eq!(records[0].payload(), Some("hello"));
    }

    #[test]
    fn append_respects_max_length() {
        let backend = MemoryBackend::new();
        for msg in ["a", "b", "c", "d"] {
            append_turn(&backend, "chat", "user", msg, &[], 3).unwrap();
        }

        let records = backend.get_history("chat").unwrap().unwrap();
        let payloads: Vec<_> = records.iter().filter_map(HistoryRecord::payload).collect();
        assert_eq!(payloads, vec!["b", "c", "d"]);
    }

    #[test]
    fn append_with_extra_fields() {
        let backend = MemoryBackend::new();
        let fields = vec!["model=gpt-3.5-turbo".to_string(), "note=a=b".to_string()];
        append_turn(&backend, "chat", "assistant", "hi", &fields, 10).unwrap();

        let records = backend.get_history("chat").unwrap().unwrap();
        let record = &records[0];
        assert_eq!(record.get_str("model"), Some("gpt-3.5-turbo"));
        assert_eq!(record.get_str("note"), Some("a=b"));
    }

    #[test]
    fn invalid_role_is_rejected() {
        let backend = MemoryBackend::new();
        let err = append_turn(&backend, "chat", "robot", "beep", &[], 10).unwrap_err();
        assert!(err.to_string().contains("robot"));
        assert!(backend.get_history("chat").unwrap().is_none());
    }

    #[test]
    fn parse_field_requires_key() {
        assert_eq!(parse_field("k=v").unwrap(), ("k", "v"));
        assert_eq!(parse_field("k=").unwrap(), ("k", ""));
        assert!(parse_field("=v").is_err());
        assert!(parse_field("novalue").is_err());
    }
}
