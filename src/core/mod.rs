//! Core types: records, the bounded history store, sessions and analysis.

pub mod analysis;
pub mod history;
pub mod record;
pub mod session;

pub use analysis::{
    AnomalyReport, HistoryBreakdown, ScoreRange, SentimentReading, SentimentTrends,
    SeriesStatistics, TextStatistics, anomalies, basic_sentiment, history_breakdown,
    sentiment_trends, text_statistics,
};
pub use history::BoundedHistoryStore;
pub use record::{HistoryRecord, RecordKind, Role};
pub use session::{ChatMessage, Session, default_export_name};
