// sentiment_analyzer.rs
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;

use crate::ai_connector::OpenAiClient;
use crate::review_table::{ReviewTable, SENTIMENT_COLUMN, SUMMARY_COLUMN};
use crate::user_interaction::print_insight_level_2;

pub const POSITIVE: &str = "Positive";
pub const NEUTRAL: &str = "Neutral";
pub const NEGATIVE: &str = "Negative";

/// Process-wide memo from review text to label. Unbounded and never
/// invalidated; a failed call is remembered as Neutral exactly like a
/// computed Neutral.
static SENTIMENT_CACHE: Lazy<Mutex<HashMap<String, String>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

static LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(positive|negative|neutral)\b").unwrap());

/// Seam between the classification loop and the hosted model, so the loop
/// is testable without a network.
#[async_trait]
pub trait SentimentModel {
    async fn classify(&self, review_text: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl SentimentModel for OpenAiClient {
    async fn classify(&self, review_text: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.classify_sentiment(review_text).await
    }
}

/// Maps a raw model reply onto one of the three labels. The model is asked
/// for exactly one word but tends to editorialize; the first recognizable
/// label word wins. Anything else is Neutral.
pub fn normalize_label(raw: &str) -> String {
    match LABEL_PATTERN.find(raw) {
        Some(found) => match found.as_str().to_lowercase().as_str() {
            "positive" => POSITIVE.to_string(),
            "negative" => NEGATIVE.to_string(),
            _ => NEUTRAL.to_string(),
        },
        None => NEUTRAL.to_string(),
    }
}

fn cache_lookup(review_text: &str) -> Option<String> {
    let cache = SENTIMENT_CACHE.lock().unwrap();
    cache.get(review_text).cloned()
}

fn cache_store(review_text: &str, label: &str) {
    let mut cache = SENTIMENT_CACHE.lock().unwrap();
    cache.insert(review_text.to_string(), label.to_string());
}

/// Label without touching the network: blank input is Neutral, and any
/// previously classified text comes straight out of the memo.
pub fn resolve_without_model(review_text: &str) -> Option<String> {
    if review_text.trim().is_empty() {
        return Some(NEUTRAL.to_string());
    }
    cache_lookup(review_text)
}

pub async fn get_sentiment<M: SentimentModel + ?Sized>(model: &M, review_text: &str) -> String {
    if let Some(label) = resolve_without_model(review_text) {
        return label;
    }

    let label = match model.classify(review_text).await {
        Ok(reply) => normalize_label(&reply),
        Err(e) => {
            print_insight_level_2(&format!("API error: {}", e));
            NEUTRAL.to_string()
        }
    };

    cache_store(review_text, &label);
    label
}

/// Walks the SUMMARY column sequentially, one request per uncached review,
/// and writes the Sentiment column in place. Returns the number of rows
/// labelled.
pub async fn analyze_reviews<M: SentimentModel + ?Sized>(
    table: &mut ReviewTable,
    model: &M,
) -> Result<usize, Box<dyn Error>> {
    if table.column_index(SUMMARY_COLUMN).is_none() {
        return Err(format!("Dataset is missing the {} column.", SUMMARY_COLUMN).into());
    }

    let summaries = table.column_values(SUMMARY_COLUMN);
    let mut labels = Vec::with_capacity(summaries.len());

    for summary in &summaries {
        labels.push(get_sentiment(model, summary).await);
    }

    let labelled = labels.len();
    table.set_column(SENTIMENT_COLUMN, labels);
    Ok(labelled)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedModel {
        calls: Mutex<usize>,
    }

    impl ScriptedModel {
        fn new() -> ScriptedModel {
            ScriptedModel {
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl SentimentModel for ScriptedModel {
        async fn classify(
            &self,
            review_text: &str,
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            *self.calls.lock().unwrap() += 1;

            if review_text.contains("outage") {
                return Err("simulated transport failure".into());
            }
            if review_text.contains("love") {
                Ok("The sentiment is Positive.".to_string())
            } else if review_text.contains("hate") {
                Ok("NEGATIVE".to_string())
            } else {
                Ok("Neutral".to_string())
            }
        }
    }

    #[test]
    fn normalize_label_maps_replies_onto_the_three_labels() {
        assert_eq!(normalize_label("Positive"), POSITIVE);
        assert_eq!(normalize_label("  positive."), POSITIVE);
        assert_eq!(normalize_label("NEGATIVE"), NEGATIVE);
        assert_eq!(normalize_label("I'd call this one neutral overall"), NEUTRAL);
        assert_eq!(normalize_label("no label here"), NEUTRAL);
        assert_eq!(normalize_label(""), NEUTRAL);
    }

    #[test]
    fn blank_text_resolves_to_neutral_without_a_model() {
        assert_eq!(resolve_without_model("").as_deref(), Some(NEUTRAL));
        assert_eq!(resolve_without_model("   \t ").as_deref(), Some(NEUTRAL));
    }

    #[tokio::test]
    async fn blank_text_never_reaches_the_model() {
        let model = ScriptedModel::new();

        assert_eq!(get_sentiment(&model, "").await, NEUTRAL);
        assert_eq!(get_sentiment(&model, "  ").await, NEUTRAL);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn repeated_text_issues_at_most_one_call() {
        let model = ScriptedModel::new();
        let text = "cache-check: love the battery life on this one";

        assert_eq!(get_sentiment(&model, text).await, POSITIVE);
        assert_eq!(get_sentiment(&model, text).await, POSITIVE);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn failures_default_to_neutral_and_are_memoized() {
        let model = ScriptedModel::new();
        let text = "failure-check: total outage review";

        assert_eq!(get_sentiment(&model, text).await, NEUTRAL);
        assert_eq!(get_sentiment(&model, text).await, NEUTRAL);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn analyze_reviews_appends_labels_and_survives_failures() {
        let csv = "\
PRODUCT,SUMMARY
Widget,analyze-check: love it
Widget,analyze-check: hate it
Gadget,analyze-check: outage mid-call
Gadget,
";
        let mut table = ReviewTable::from_csv_str(csv).unwrap();
        let model = ScriptedModel::new();

        let labelled = analyze_reviews(&mut table, &model).await.unwrap();

        assert_eq!(labelled, 4);
        assert_eq!(
            table.column_values(SENTIMENT_COLUMN),
            vec![POSITIVE, NEGATIVE, NEUTRAL, NEUTRAL]
        );
        // The blank summary never went out; the other three did, once each
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn analyze_reviews_requires_the_summary_column() {
        let mut table = ReviewTable::from_csv_str("PRODUCT\nWidget\n").unwrap();
        let model = ScriptedModel::new();

        assert!(analyze_reviews(&mut table, &model).await.is_err());
        assert_eq!(model.call_count(), 0);
    }
}
