//! histkeep - bounded, persistent conversation history.
//!
//! Keeps the most recent records of a conversation in a capped FIFO store
//! and persists them as a plain JSON array, one file per session.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
