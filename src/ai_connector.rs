// ai_connector.rs
use serde_json::{json, Value};
use std::error::Error;

use crate::settings::DEFAULT_OPENAI_MODEL;

const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const CLASSIFICATION_INSTRUCTION: &str =
    "Classify the sentiment of the following review as exactly one word: Positive, Negative, or Neutral.";

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> OpenAiClient {
        let model = if model.trim().is_empty() {
            DEFAULT_OPENAI_MODEL.to_string()
        } else {
            model
        };

        OpenAiClient {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One zero-temperature chat completion per review; returns the raw
    /// reply text for the analyzer to normalize into a label.
    pub async fn classify_sentiment(
        &self,
        review_text: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": CLASSIFICATION_INSTRUCTION },
                {
                    "role": "user",
                    "content": format!("What's the sentiment of this review? {}", review_text)
                }
            ],
            "temperature": 0.0,
            "max_tokens": 100
        });

        let response = self
            .client
            .post(OPENAI_CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;

        match payload["choices"][0]["message"]["content"].as_str() {
            Some(content) => Ok(content.trim().to_string()),
            None => Err(format!("Unexpected OpenAI response shape: {}", payload).into()),
        }
    }
}
