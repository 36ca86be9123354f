//! History record types.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Fields probed, in order, for a record's main text.
const PAYLOAD_KEYS: [&str; 7] = [
    "content", "payload", "summary", "code", "prompt", "response", "text",
];

/// One interaction in a history.
///
/// Only `timestamp` is mandatory. Every other field is free-form and passed
/// through persistence unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// ISO-8601 time the record was created.
    pub timestamp: String,

    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl HistoryRecord {
    /// Create a record stamped with the current local time.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Local::now().to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    /// Create a record with an explicit timestamp.
    #[must_use]
    pub fn at(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            fields: Map::new(),
        }
    }

    /// Add a field. A `timestamp` key is ignored; set the field directly.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field. A `timestamp` key is ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key != "timestamp" {
            self.fields.insert(key, value.into());
        }
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a string field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// All fields except `timestamp`.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The chat role, or the record kind for non-chat records.
    ///
    /// Falls back to `type`, which older code-assistant histories used.
    #[must_use]
    pub fn role_or_kind(&self) -> Option<&str> {
        self.get_str("role")
            .or_else(|| self.get_str("kind"))
            .or_else(|| self.get_str("type"))
    }

    /// The record's main text, if it has one.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        PAYLOAD_KEYS.iter().find_map(|key| self.get_str(key))
    }

    /// Parse the timestamp.
    ///
    /// Accepts RFC 3339, or a naive ISO-8601 datetime which is taken as UTC.
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        self.timestamp
            .parse::<NaiveDateTime>()
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Chat participant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// The human side.
    User,
    /// The model side.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a role name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed shapes of the records each kind of assistant produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKind {
    /// A chat turn. Serialized without a `kind` tag.
    Chat {
        /// Who spoke.
        role: Role,
        /// What was said.
        content: String,
    },

    /// An image generation request and its result.
    Image {
        /// Text description of the image.
        prompt: String,
        /// Where the generated image lives.
        url: String,
        /// Requested dimensions, e.g. `1024x1024`.
        size: String,
        /// `standard` or `hd`.
        quality: String,
        /// `vivid` or `natural`.
        style: String,
    },

    /// A text summarization.
    Summary {
        /// Length of the input text in characters.
        original_length: usize,
        /// Length of the summary in characters.
        summary_length: usize,
        /// Requested style, e.g. `concise`.
        style: String,
        /// Requested maximum length in words.
        max_length: usize,
        /// The summary itself.
        summary: String,
    },

    /// A sentiment analysis result.
    Sentiment {
        /// `positive`, `negative` or `neutral`.
        sentiment: String,
        /// Score on a 0 to 10 scale.
        score: f64,
        /// Confidence percentage.
        confidence: u32,
        /// Short explanation.
        summary: String,
        /// Length of the analysed text in characters.
        text_length: usize,
    },

    /// A code assistant operation (generate, debug, explain, ...).
    Code {
        /// Which operation ran.
        operation: String,
        /// Programming language.
        language: String,
        /// Description or source code given to the assistant.
        input: String,
        /// What came back.
        output: String,
    },

    /// A dataset analysis run.
    Analysis {
        /// `comprehensive`, `quick` or `detailed`.
        analysis_type: String,
        /// Rows and columns of the analysed dataset.
        dataset_shape: (usize, usize),
        /// Number of columns the analysis covered.
        columns_analyzed: usize,
        /// What the analysis found.
        summary: String,
    },

    /// A speech-to-text transcription.
    Transcript {
        /// Audio file that was transcribed.
        audio_file: String,
        /// Transcribed text.
        text: String,
    },
}

impl RecordKind {
    /// Shorthand for a chat turn.
    #[must_use]
    pub fn chat(role: Role, content: impl Into<String>) -> Self {
        Self::Chat {
            role,
            content: content.into(),
        }
    }

    /// Build a summary record, deriving both lengths from the texts.
    #[must_use]
    pub fn summary(
        original: &str,
        summary: impl Into<String>,
        style: &str,
        max_length: usize,
    ) -> Self {
        let summary = summary.into();
        Self::Summary {
            original_length: original.chars().count(),
            summary_length: summary.chars().count(),
            style: style.to_string(),
            max_length,
            summary,
        }
    }

    /// Stamp this record with the current time.
    #[must_use]
    pub fn into_record(self) -> HistoryRecord {
        self.into_record_at(HistoryRecord::now().timestamp)
    }

    /// Stamp this record with an explicit timestamp.
    #[must_use]
    pub fn into_record_at(self, timestamp: impl Into<String>) -> HistoryRecord {
        let is_chat = matches!(self, Self::Chat { .. });
        let mut record = HistoryRecord::at(timestamp);
        // Unit-free struct variants always serialize to an object
        if let Ok(Value::Object(map)) = serde_json::to_value(&self) {
            for (key, value) in map {
                if is_chat && key == "kind" {
                    continue;
                }
                record.insert(key, value);
            }
        }
        record
    }
}

impl From<RecordKind> for HistoryRecord {
    fn from(kind: RecordKind) -> Self {
        kind.into_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_record_is_untagged() {
        let record = RecordKind::chat(Role::User, "hello").into_record_at("2024-01-01T00:00:00Z");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            json!({"timestamp": "2024-01-01T00:00:00Z", "role": "user", "content": "hello"})
        );
        assert_eq!(record.role_or_kind(), Some("user"));
        assert_eq!(record.payload(), Some("hello"));
    }

    #[test]
    fn image_record_is_tagged() {
        let record = RecordKind::Image {
            prompt: "a lighthouse".to_string(),
            url: "https://img.example/1.png".to_string(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            style: "vivid".to_string(),
        }
        .into_record_at("2024-01-01T00:00:00Z");

        assert_eq!(record.role_or_kind(), Some("image"));
        assert_eq!(record.payload(), Some("a lighthouse"));
        assert_eq!(record.get_str("url"), Some("https://img.example/1.png"));
    }

    #[test]
    fn summary_lengths_count_characters() {
        let record = RecordKind::summary("héllo wörld", "hi", "concise", 150).into_record();
        assert_eq!(record.get("original_length"), Some(&json!(11)));
        assert_eq!(record.get("summary_length"), Some(&json!(2)));
        assert_eq!(record.payload(), Some("hi"));
    }

    #[test]
    fn analysis_record_shape() {
        let record = RecordKind::Analysis {
            analysis_type: "quick".to_string(),
            dataset_shape: (120, 4),
            columns_analyzed: 4,
            summary: "two columns correlate".to_string(),
        }
        .into_record_at("2024-01-01T00:00:00Z");

        assert_eq!(record.role_or_kind(), Some("analysis"));
        assert_eq!(record.get("dataset_shape"), Some(&json!([120, 4])));
        assert_eq!(record.get("columns_analyzed"), Some(&json!(4)));
        assert_eq!(record.payload(), Some("two columns correlate"));
    }

    #[test]
    fn legacy_type_field_is_kind() {
        let record: HistoryRecord = serde_json::from_value(json!({
            "type": "generation",
            "code": "fn main() {}",
            "timestamp": "2024-01-01T10:00:00.123456"
        }))
        .unwrap();
        assert_eq!(record.role_or_kind(), Some("generation"));
        assert_eq!(record.payload(), Some("fn main() {}"));
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let result = serde_json::from_value::<HistoryRecord>(json!({"role": "user"}));
        assert!(result.is_err());
    }

    #[test]
    fn non_string_timestamp_is_rejected() {
        let result = serde_json::from_value::<HistoryRecord>(json!({"timestamp": 12}));
        assert!(result.is_err());
    }

    #[test]
    fn insert_ignores_timestamp_key() {
        let record = HistoryRecord::at("t0").with_field("timestamp", "t1");
        assert_eq!(record.timestamp, "t0");
        assert!(record.fields().is_empty());
    }

    #[test]
    fn parses_rfc3339_and_naive_timestamps() {
        let rfc = HistoryRecord::at("2024-03-01T12:00:00+02:00");
        assert_eq!(
            rfc.parsed_timestamp().unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );

        let naive = HistoryRecord::at("2024-03-01T12:00:00.5");
        assert_eq!(
            naive.parsed_timestamp().unwrap().to_rfc3339(),
            "2024-03-01T12:00:00.500+00:00"
        );

        assert!(HistoryRecord::at("yesterday").parsed_timestamp().is_none());
    }

    #[test]
    fn now_produces_parseable_timestamp() {
        assert!(HistoryRecord::now().parsed_timestamp().is_some());
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("USER"), Some(Role::User));
        assert_eq!(Role::parse("Assistant"), Some(Role::Assistant));
        assert_eq!(Role::parse("robot"), None);
        assert_eq!(Role::System.to_string(), "system");
    }
}
