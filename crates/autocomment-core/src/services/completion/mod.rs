use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

use crate::error::CommenterError;

pub const API_KEY_ENV: &str = "COMPLETION_API_KEY";
pub const BASE_URL_ENV: &str = "COMPLETION_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/completions";

/// One text-completion round trip: prompt plus sampling parameters in,
/// completion text out.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClientTrait: Send + Sync {
    /// Returns the completion text. Any error here is recoverable from the
    /// caller's point of view: the unit falls back to its original form.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// HTTP client for the completion service.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CompletionClient {
    /// Reads the API key from the environment and builds a client with a
    /// per-request timeout. A missing key is fatal: no unit could ever be
    /// processed without one.
    pub fn new(timeout: Duration) -> std::result::Result<Self, CommenterError> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| {
            CommenterError::service(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| CommenterError::service(format!("cannot build HTTP client: {error}")))?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl CompletionClientTrait for CompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        tracing::debug!(
            prompt_bytes = request.prompt.len(),
            max_tokens = request.max_tokens,
            "requesting completion"
        );

        let response = self
            .client
            .post(&self.base_url)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("completion request failed with {status}: {body}");
        }

        let body: CompletionResponse = response.json().await?;
        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .unwrap_or_default();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_all_sampling_parameters() {
        let request = CompletionRequest {
            model: "code-davinci-002".into(),
            prompt: "Original code:\n".into(),
            max_tokens: 1500,
            temperature: 0.0,
            stop: "Original code:".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "code-davinci-002");
        assert_eq!(value["max_tokens"], 1500);
        assert_eq!(value["temperature"], 0.0);
        assert_eq!(value["stop"], "Original code:");
    }

    #[test]
    fn response_text_comes_from_first_choice() {
        let body: CompletionResponse = serde_json::from_str(
            r#"{"id":"cmpl-1","object":"text_completion","choices":[{"text":"def f():\n","index":0,"finish_reason":"stop"},{"text":"ignored","index":1,"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        let text = body.choices.into_iter().next().map(|c| c.text);
        assert_eq!(text.as_deref(), Some("def f():\n"));
    }

    #[test]
    fn empty_choices_yield_empty_text() {
        let body: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(body.choices.is_empty());
    }
}
