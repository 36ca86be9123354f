//! `histkeep new` command implementation.

use crate::cli::open_backend;
use crate::config::Config;
use crate::error::Result;
use crate::storage::HistoryBackend;
use uuid::Uuid;

/// Run the new command.
///
/// Creates an empty session under a fresh id and prints the id.
///
/// # Errors
///
/// Returns an error if the storage backend fails.
pub fn run(config: &Config) -> Result<()> {
    let backend = open_backend(config)?;
    let session_id = create_session(&backend)?;
    println!("{session_id}");
    Ok(())
}

/// Store an empty history under a new UUID v4 session id.
fn create_session(backend: &dyn HistoryBackend) -> Result<String> {
    let session_id = Uuid::new_v4().to_string();
    backend.put_history(&session_id, &[])?;
    Ok(session_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, validate_session_id};

    #[test]
    fn creates_empty_session() {
        let backend = MemoryBackend::new();
        let id = create_session(&backend).unwrap();

        assert!(validate_session_id(&id).is_ok());
        assert!(backend.get_history(&id).unwrap().unwrap().is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let backend = MemoryBackend::new();
        let a = create_session(&backend).unwrap();
        let b = create_session(&backend).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.list_sessions(10).unwrap().len(), 2);
    }
}
