//! Storage backends for session histories.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use traits::{HistoryBackend, SessionSummary, validate_session_id};
