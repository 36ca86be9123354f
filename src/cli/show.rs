//! `histkeep show` command implementation.

use crate::cli::{open_backend, require_history};
use crate::config::Config;
use crate::core::HistoryRecord;
use crate::error::Result;
use serde_json::Value;

/// Maximum characters of a payload shown on the summary line.
const PREVIEW_LEN: usize = 60;

/// Run the show command.
///
/// Prints the session's records, oldest first.
///
/// # Errors
///
/// Returns an error if the storage backend fails or the session is not found.
pub fn run(
    config: &Config,
    session_id: &str,
    last: Option<usize>,
    verbose: bool,
    json: bool,
) -> Result<()> {
    let backend = open_backend(config)?;
    let mut records = require_history(&backend, session_id)?;

    if let Some(n) = last {
        let skip = records.len().saturating_sub(n);
        records.drain(..skip);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("Session: {session_id}");
    println!("Records: {}", records.len());
    println!();

    if records.is_empty() {
        println!("(no records)");
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        println!("{}", format_line(i + 1, record));

        if verbose {
            for (key, value) in extra_fields(record) {
                let rendered = serde_json::to_string_pretty(value)?;
                let mut lines = rendered.lines();
                if let Some(first) = lines.next() {
                    println!("      {key}: {first}");
                }
                for line in lines {
                    println!("      {line}");
                }
            }
            println!();
        }
    }

    Ok(())
}

/// One summary line: index, time, role or kind, payload preview.
fn format_line(index: usize, record: &HistoryRecord) -> String {
    let time = record
        .parsed_timestamp()
        .map_or_else(
            || record.timestamp.clone(),
            |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
    let kind = record.role_or_kind().unwrap_or("-");
    let payload = preview(record.payload().unwrap_or(""));
    format!("[{index:>3}] {time} {kind:<10} {payload}")
}

/// First line of `text`, cut to `PREVIEW_LEN` characters.
fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() > PREVIEW_LEN {
        let cut: String = first_line.chars().take(PREVIEW_LEN).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

/// Fields not already shown on the summary line.
fn extra_fields(record: &HistoryRecord) -> impl Iterator<Item = (&str, &Value)> {
    let shown_kind = record.role_or_kind();
    let shown_payload = record.payload();
    record.fields().iter().filter_map(move |(key, value)| {
        let is_kind = matches!(key.as_str(), "role" | "kind" | "type")
            && shown_kind.is_some()
            && value.as_str() == shown_kind;
        let is_payload = shown_payload.is_some() && value.as_str() == shown_payload;
        (!is_kind && !is_payload).then_some((key.as_str(), value))
    })
}
