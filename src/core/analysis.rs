//! Descriptive statistics over texts and histories.

use crate::core::record::HistoryRecord;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const POSITIVE_WORDS: [&str; 8] = [
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "happy",
    "love",
    "like",
];

const NEGATIVE_WORDS: [&str; 8] = [
    "bad",
    "terrible",
    "awful",
    "hate",
    "dislike",
    "sad",
    "angry",
    "frustrated",
];

/// Basic counts and averages for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStatistics {
    /// Unicode scalar values.
    pub character_count: usize,
    /// Whitespace-separated words.
    pub word_count: usize,
    /// Non-blank pieces between `.`, `!` and `?` runs.
    pub sentence_count: usize,
    /// Zero when there are no sentences.
    pub average_words_per_sentence: f64,
    /// Zero when there are no words.
    pub average_word_length: f64,
}

fn sentence_splitter() -> &'static Regex {
    static SPLITTER: OnceLock<Regex> = OnceLock::new();
    SPLITTER.get_or_init(|| Regex::new(r"[.!?]+").expect("static regex is valid"))
}

/// Compute [`TextStatistics`] for `text`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_statistics(text: &str) -> TextStatistics {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentence_count = sentence_splitter()
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count();
    let letters: usize = words.iter().map(|w| w.chars().count()).sum();

    TextStatistics {
        character_count: text.chars().count(),
        word_count: words.len(),
        sentence_count,
        average_words_per_sentence: ratio(words.len(), sentence_count),
        average_word_length: ratio(letters, words.len()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Sentiment derived without a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReading {
    /// `positive`, `negative` or `neutral`.
    pub sentiment: String,
    /// 0 to 10.
    pub score: f64,
    /// Always 60 for keyword readings.
    pub confidence: u32,
    /// How the reading was obtained.
    pub summary: String,
}

/// Keyword-count sentiment, used when a provider reply is not structured.
#[must_use]
pub fn basic_sentiment(text: &str) -> SentimentReading {
    let lower = text.to_lowercase();
    let count = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count();
    let positive = count(&POSITIVE_WORDS);
    let negative = count(&NEGATIVE_WORDS);

    let (sentiment, score) = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => ("positive", (5 + positive).min(10)),
        std::cmp::Ordering::Less => ("negative", 5usize.saturating_sub(negative)),
        std::cmp::Ordering::Equal => ("neutral", 5),
    };

    SentimentReading {
        sentiment: sentiment.to_string(),
        score: f64::from(u32::try_from(score).unwrap_or(10)),
        confidence: 60,
        summary: "Basic sentiment analysis based on keyword detection".to_string(),
    }
}

/// Aggregate view over a series of sentiment records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentTrends {
    /// Records considered.
    pub total_analyses: usize,
    /// Count per sentiment label.
    pub sentiment_distribution: BTreeMap<String, usize>,
    /// Mean of numeric scores, 5 when none are present.
    pub average_score: f64,
    /// Ties go to the label seen first.
    pub most_common_sentiment: String,
    /// Lowest and highest score, 0 to 10 when none are present.
    pub score_range: ScoreRange,
}

/// Closed score interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreRange {
    /// Lowest score.
    pub min: f64,
    /// Highest score.
    pub max: f64,
}

/// Summarize the `sentiment` and `score` fields of `records`.
///
/// Returns `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sentiment_trends(records: &[HistoryRecord]) -> Option<SentimentTrends> {
    if records.is_empty() {
        return None;
    }

    let mut distribution = BTreeMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for record in records {
        let label = record.get_str("sentiment").unwrap_or("neutral");
        *distribution.entry(label.to_string()).or_insert(0usize) += 1;
        if !first_seen.contains(&label) {
            first_seen.push(label);
        }
    }

    let scores: Vec<f64> = records
        .iter()
        .filter_map(|r| r.get("score").and_then(serde_json::Value::as_f64))
        .collect();

    let top = first_seen
        .iter()
        .map(|label| distribution[*label])
        .max()
        .unwrap_or(0);
    let most_common = first_seen
        .iter()
        .find(|label| distribution[**label] == top)
        .map_or_else(|| "neutral".to_string(), |label| (*label).to_string());

    let (average_score, min_score, max_score) = if scores.is_empty() {
        (5.0, 0.0, 10.0)
    } else {
        (
            scores.iter().sum::<f64>() / scores.len() as f64,
            scores.iter().copied().fold(f64::INFINITY, f64::min),
            scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    Some(SentimentTrends {
        total_analyses: records.len(),
        sentiment_distribution: distribution,
        average_score,
        most_common_sentiment: most_common,
        score_range: ScoreRange {
            min: min_score,
            max: max_score,
        },
    })
}

/// Z-score above which a value is an anomaly.
const Z_SCORE_THRESHOLD: f64 = 3.0;

/// IQR multiple outside the quartiles at which a value is an anomaly.
const IQR_THRESHOLD: f64 = 1.5;

/// Location and spread of a numeric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStatistics {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation, 0 for a single value.
    pub std: f64,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// `q3 - q1`.
    pub iqr: f64,
}

/// Outliers found in a numeric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// Finite values considered.
    pub total_values: usize,
    /// Values more than three standard deviations from the mean.
    pub anomalies_z_score: usize,
    /// Values outside `q1 - 1.5 iqr ..= q3 + 1.5 iqr`.
    pub anomalies_iqr: usize,
    /// Share of z-score anomalies, in percent.
    pub anomaly_percentage: f64,
    /// Statistics the thresholds were derived from.
    pub statistics: SeriesStatistics,
    /// Positions of the z-score anomalies among the finite values.
    pub anomaly_values: Vec<usize>,
}

/// Flag outliers in `values` by z-score and by interquartile range.
///
/// NaN and infinite values are ignored. Returns `None` when nothing is left.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn anomalies(values: &[f64]) -> Option<AnomalyReport> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if data.is_empty() {
        return None;
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let std = if data.len() > 1 {
        (data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };

    let mut sorted = data.clone();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_THRESHOLD * iqr;
    let upper = q3 + IQR_THRESHOLD * iqr;

    // A constant series has no z-scores
    let anomaly_values: Vec<usize> = if std > 0.0 {
        data.iter()
            .enumerate()
            .filter(|(_, v)| ((*v - mean) / std).abs() > Z_SCORE_THRESHOLD)
            .map(|(i, _)| i)
            .collect()
    } else {
        Vec::new()
    };
    let anomalies_iqr = data.iter().filter(|v| **v < lower || **v > upper).count();

    Some(AnomalyReport {
        total_values: data.len(),
        anomalies_z_score: anomaly_values.len(),
        anomalies_iqr,
        anomaly_percentage: anomaly_values.len() as f64 / n * 100.0,
        statistics: SeriesStatistics {
            mean,
            std,
            q1,
            q3,
            iqr,
        },
        anomaly_values,
    })
}

/// Linearly interpolated quantile of a sorted, non-empty slice.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Record counts per role or kind, with the time span covered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryBreakdown {
    /// Count per `role_or_kind`, `unknown` when a record has neither.
    pub by_kind: BTreeMap<String, usize>,
    /// Timestamp of the oldest record.
    pub first_timestamp: Option<String>,
    /// Timestamp of the newest record.
    pub last_timestamp: Option<String>,
}

/// Break a history down by record kind.
#[must_use]
pub fn history_breakdown(records: &[HistoryRecord]) -> HistoryBreakdown {
    let mut by_kind = BTreeMap::new();
    for record in records {
        let kind = record.role_or_kind().unwrap_or("unknown");
        *by_kind.entry(kind.to_string()).or_insert(0) += 1;
    }
    HistoryBreakdown {
        by_kind,
        first_timestamp: records.first().map(|r| r.timestamp.clone()),
        last_timestamp: records.last().map(|r| r.timestamp.clone()),
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)] // Exact float comparisons are safe for these test values
mod tests {
    use super::*;
    use crate::core::record::RecordKind;
    use serde_json::json;

    fn sentiment(label: &str, score: f64) -> HistoryRecord {
        RecordKind::Sentiment {
            sentiment: label.to_string(),
            score,
            confidence: 80,
            summary: String::new(),
            text_length: 10,
        }
        .into_record_at("2024-01-01T00:00:00Z")
    }

    #[test]
    fn text_statistics_basic() {
        let stats = text_statistics("Hello world. How are you? Fine!");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.sentence_count, 3);
        assert_eq!(stats.character_count, 31);
        assert_eq!(stats.average_words_per_sentence, 2.0);
        // Hello world. How are you? Fine! -> 5+6+3+3+4+5 = 26
        assert!((stats.average_word_length - 26.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn text_statistics_drops_blank_pieces() {
        // Splits into ["Hi", " "]; only the non-blank piece counts
        let stats = text_statistics("Hi! ");
        assert_eq!(stats.sentence_count, 1);
        assert_eq!(stats.average_words_per_sentence, 1.0);
    }

    #[test]
    fn text_statistics_empty() {
        let stats = text_statistics("");
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.sentence_count, 0);
        assert_eq!(stats.average_words_per_sentence, 0.0);
        assert_eq!(stats.average_word_length, 0.0);
    }

    #[test]
    fn text_statistics_ignores_trailing_punctuation_runs() {
        let stats = text_statistics("Wait... what?!  ");
        assert_eq!(stats.sentence_count, 2);
    }

    #[test]
    fn basic_sentiment_positive() {
        let reading = basic_sentiment("I love this, it is GREAT and amazing");
        assert_eq!(reading.sentiment, "positive");
        assert_eq!(reading.score, 8.0);
        assert_eq!(reading.confidence, 60);
    }

    #[test]
    fn basic_sentiment_negative_floors_at_zero() {
        let reading = basic_sentiment("bad terrible awful hate dislike sad angry");
        assert_eq!(reading.sentiment, "negative");
        assert_eq!(reading.score, 0.0);
    }

    #[test]
    fn basic_sentiment_neutral_on_tie() {
        let reading = basic_sentiment("good but bad");
        assert_eq!(reading.sentiment, "neutral");
        assert_eq!(reading.score, 5.0);
    }

    #[test]
    fn basic_sentiment_caps_at_ten() {
        let reading =
            basic_sentiment("good great excellent amazing wonderful happy love like");
        assert_eq!(reading.score, 10.0);
    }

    #[test]
    fn trends_empty_is_none() {
        assert!(sentiment_trends(&[]).is_none());
    }

    #[test]
    fn trends_distribution_and_scores() {
        let records = vec![
            sentiment("positive", 8.0),
            sentiment("negative", 2.0),
            sentiment("positive", 6.5),
        ];
        let trends = sentiment_trends(&records).unwrap();
        assert_eq!(trends.total_analyses, 3);
        assert_eq!(trends.sentiment_distribution["positive"], 2);
        assert_eq!(trends.sentiment_distribution["negative"], 1);
        assert_eq!(trends.most_common_sentiment, "positive");
        assert_eq!(trends.average_score, 5.5);
        assert_eq!(trends.score_range, ScoreRange { min: 2.0, max: 8.0 });
    }

    #[test]
    fn trends_tie_goes_to_first_seen() {
        let records = vec![sentiment("negative", 3.0), sentiment("positive", 7.0)];
        let trends = sentiment_trends(&records).unwrap();
        assert_eq!(trends.most_common_sentiment, "negative");
    }

    #[test]
    fn trends_without_scores_use_defaults() {
        let records = vec![HistoryRecord::at("t").with_field("note", json!("no fields"))];
        let trends = sentiment_trends(&records).unwrap();
        assert_eq!(trends.sentiment_distribution["neutral"], 1);
        assert_eq!(trends.average_score, 5.0);
        assert_eq!(trends.score_range, ScoreRange { min: 0.0, max: 10.0 });
    }

    #[test]
    fn trends_serialize_nested_score_range() {
        let trends = sentiment_trends(&[sentiment("positive", 7.0)]).unwrap();
        let json = serde_json::to_value(&trends).unwrap();
        assert_eq!(json["score_range"], json!({"min": 7.0, "max": 7.0}));
        assert!(json.get("min_score").is_none());
    }

    #[test]
    fn anomalies_flags_far_outlier_both_ways() {
        let mut values = vec![10.0; 12];
        values.push(100.0);

        let report = anomalies(&values).unwrap();
        assert_eq!(report.total_values, 13);
        assert_eq!(report.anomalies_z_score, 1);
        assert_eq!(report.anomalies_iqr, 1);
        assert_eq!(report.anomaly_values, vec![12]);
        assert!((report.anomaly_percentage - 100.0 / 13.0).abs() < 1e-9);
        assert_eq!(report.statistics.iqr, 0.0);
    }

    #[test]
    fn anomalies_iqr_catches_what_z_score_misses() {
        let report = anomalies(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(report.anomalies_z_score, 0);
        assert_eq!(report.anomalies_iqr, 1);
        assert_eq!(report.statistics.q1, 2.0);
        assert_eq!(report.statistics.q3, 4.0);
        assert_eq!(report.statistics.mean, 22.0);
    }

    #[test]
    fn anomalies_quartiles_interpolate() {
        let report = anomalies(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(report.statistics.q1, 1.75);
        assert_eq!(report.statistics.q3, 3.25);
        assert_eq!(report.anomalies_iqr, 0);
    }

    #[test]
    fn anomalies_edge_inputs() {
        assert!(anomalies(&[]).is_none());
        assert!(anomalies(&[f64::NAN, f64::INFINITY]).is_none());

        let single = anomalies(&[5.0, f64::NAN]).unwrap();
        assert_eq!(single.total_values, 1);
        assert_eq!(single.statistics.std, 0.0);
        assert_eq!(single.anomalies_z_score, 0);
        assert_eq!(single.anomalies_iqr, 0);
    }

    #[test]
    fn breakdown_counts_kinds() {
        let records = vec![
            RecordKind::chat(crate::core::Role::User, "a").into_record_at("t1"),
            RecordKind::chat(crate::core::Role::Assistant, "b").into_record_at("t2"),
            sentiment("positive", 9.0),
            HistoryRecord::at("t4"),
        ];
        let breakdown = history_breakdown(&records);
        assert_eq!(breakdown.by_kind["user"], 1);
        assert_eq!(breakdown.by_kind["assistant"], 1);
        assert_eq!(breakdown.by_kind["sentiment"], 1);
        assert_eq!(breakdown.by_kind["unknown"], 1);
        assert_eq!(breakdown.first_timestamp.as_deref(), Some("t1"));
        assert_eq!(breakdown.last_timestamp.as_deref(), Some("t4"));
    }
}
