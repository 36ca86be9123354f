//! `histkeep stats` command implementation.

use crate::cli::{open_backend, require_history};
use crate::config::Config;
use crate::core::{
    AnomalyReport, HistoryBreakdown, HistoryRecord, SentimentTrends, TextStatistics, anomalies,
    basic_sentiment, history_breakdown, sentiment_trends, text_statistics,
};
use crate::error::Result;
use serde_json::Value;

/// Everything the stats command reports for one session.
#[derive(Debug)]
struct SessionStats {
    breakdown: HistoryBreakdown,
    text: TextStatistics,
    sentiment: Option<SentimentTrends>,
    score_anomalies: Option<AnomalyReport>,
}

impl SessionStats {
    fn from_records(records: &[HistoryRecord]) -> Self {
        let payloads: Vec<&str> = records.iter().filter_map(HistoryRecord::payload).collect();
        let sentiment_records: Vec<HistoryRecord> =
            records.iter().filter_map(sentiment_record).collect();
        let scores: Vec<f64> = records
            .iter()
            .filter_map(|r| r.get("score").and_then(Value::as_f64))
            .collect();

        Self {
            breakdown: history_breakdown(records),
            text: text_statistics(&payloads.join("\n")),
            sentiment: sentiment_trends(&sentiment_records),
            score_anomalies: anomalies(&scores),
        }
    }
}

/// A record's sentiment, labelled by keywords when it carries text but no label.
fn sentiment_record(record: &HistoryRecord) -> Option<HistoryRecord> {
    if record.get("sentiment").is_some() {
        return Some(record.clone());
    }
    if record.role_or_kind() != Some("sentiment") {
        return None;
    }
    let reading = basic_sentiment(record.payload()?);
    Some(
        record
            .clone()
            .with_field("sentiment", reading.sentiment)
            .with_field("score", reading.score),
    )
}

/// Run the stats command.
///
/// # Errors
///
/// Returns an error if the session is not found or storage fails.
pub fn run(config: &Config, session_id: &str) -> Result<()> {
    let backend = open_backend(config)?;
    let records = require_history(&backend, session_id)?;
    let stats = SessionStats::from_records(&records);

    println!("Session: {session_id}");
    println!("Records: {}", records.len());
    if let (Some(first), Some(last)) = (
        &stats.breakdown.first_timestamp,
        &stats.breakdown.last_timestamp,
    ) {
        println!("Span:    {first} .. {last}");
    }

    render_breakdown(&stats.breakdown);
    render_text(&stats.text);
    if let Some(trends) = &stats.sentiment {
        render_sentiment(trends);
    }
    if let Some(report) = &stats.score_anomalies {
        render_anomalies(report);
    }

    Ok(())
}

fn render_breakdown(breakdown: &HistoryBreakdown) {
    if breakdown.by_kind.is_empty() {
        return;
    }
    println!("\nBy kind:");
    println!("{}", "─".repeat(30));
    for (kind, count) in &breakdown.by_kind {
        println!("  {kind:<16} {count:>8}");
    }
}

fn render_text(text: &TextStatistics) {
    println!("\nText:");
    println!("{}", "─".repeat(30));
    println!("  Characters:          {:>8}", text.character_count);
    println!("  Words:               {:>8}", text.word_count);
    println!("  Sentences:           {:>8}", text.sentence_count);
    println!(
        "  Words per sentence:  {:>8.1}",
        text.average_words_per_sentence
    );
    println!("  Avg word length:     {:>8.1}", text.average_word_length);
}

fn render_sentiment(trends: &SentimentTrends) {
    println!("\nSentiment ({} analyses):", trends.total_analyses);
    println!("{}", "─".repeat(30));
    for (label, count) in &trends.sentiment_distribution {
        println!("  {label:<16} {count:>8}");
    }
    println!("  Most common:  {}", trends.most_common_sentiment);
    println!(
        "  Score:        avg {:.1}, min {:.1}, max {:.1}",
        trends.average_score, trends.score_range.min, trends.score_range.max
    );
}

fn render_anomalies(report: &AnomalyReport) {
    println!("\nScore anomalies ({} values):", report.total_values);
    println!("{}", "─".repeat(30));
    println!("  Z-score:      {:>8}", report.anomalies_z_score);
    println!("  IQR:          {:>8}", report.anomalies_iqr);
    println!(
        "  Mean/std:     {:.2} / {:.2}",
        report.statistics.mean, report.statistics.std
    );
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::core::{RecordKind, Role};

    #[test]
    fn stats_over_mixed_history() {
        let records = vec![
            RecordKind::chat(Role::User, "Hello there. How are you?").into_record_at("t1"),
            RecordKind::chat(Role::Assistant, "Fine!").into_record_at("t2"),
            HistoryRecord::at("t3")
                .with_field("kind", "sentiment")
                .with_field("text", "I love it")
                .with_field("sentiment", "positive")
                .with_field("score", 6.0),
        ];

        let stats = SessionStats::from_records(&records);

        assert_eq!(stats.breakdown.by_kind["user"], 1);
        assert_eq!(stats.breakdown.by_kind["assistant"], 1);
        assert_eq!(stats.breakdown.by_kind["sentiment"], 1);
        assert_eq!(stats.text.word_count, 9);
        assert_eq!(stats.text.sentence_count, 4);

        let trends = stats.sentiment.unwrap();
        assert_eq!(trends.total_analyses, 1);
        assert_eq!(trends.most_common_sentiment, "positive");
    }

    #[test]
    fn unlabelled_sentiment_record_uses_keywords() {
        let records = vec![
            HistoryRecord::at("t1")
                .with_field("kind", "sentiment")
                .with_field("text", "this is terrible and sad"),
            HistoryRecord::at("t2")
                .with_field("kind", "sentiment")
                .with_field("sentiment", "positive")
                .with_field("score", 9.0),
        ];

        let trends = SessionStats::from_records(&records).sentiment.unwrap();
        assert_eq!(trends.total_analyses, 2);
        assert_eq!(trends.sentiment_distribution["negative"], 1);
        assert_eq!(trends.sentiment_distribution["positive"], 1);
        assert_eq!(trends.score_range.min, 3.0);
        assert_eq!(trends.score_range.max, 9.0);
    }

    #[test]
    fn score_anomalies_cover_numeric_scores() {
        let mut records: Vec<HistoryRecord> = (0..12)
            .map(|i| HistoryRecord::at(i.to_string()).with_field("score", 5.0))
            .collect();
        records.push(HistoryRecord::at("12").with_field("score", 50.0));
        records.push(RecordKind::chat(Role::User, "no score").into_record_at("13"));

        let report = SessionStats::from_records(&records).score_anomalies.unwrap();
        assert_eq!(report.total_values, 13);
        assert_eq!(report.anomalies_z_score, 1);
        assert_eq!(report.anomalies_iqr, 1);
    }

    #[test]
    fn stats_without_sentiment_records() {
        let records = vec![RecordKind::chat(Role::User, "hi").into_record_at("t")];
        let stats = SessionStats::from_records(&records);
        assert!(stats.sentiment.is_none());
        assert_eq!(stats.text.word_count, 1);
    }

    #[test]
    fn stats_on_empty_history() {
        let stats = SessionStats::from_records(&[]);
        assert!(stats.breakdown.by_kind.is_empty());
        assert_eq!(stats.text.character_count, 0);
        assert!(stats.sentiment.is_none());
        assert!(stats.score_anomalies.is_none());
    }
}
