//! Blocking HTTP client for an Ollama-compatible chat endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::LlmClient;
use super::StructuringError;
use crate::config::LlmConfig;

/// Sampling temperature for structuring calls. Kept near zero so the
/// model reproduces the document instead of paraphrasing it.
pub const TEMPERATURE: f32 = 0.05;

pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(&config.base_url, config.timeout_secs)
    }
}

impl LlmClient for OllamaClient {
    fn chat(&self, model: &str, prompt: &str) -> Result<String, StructuringError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(%url, model, prompt_chars = prompt.len(), "Sending chat request");

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatOptions {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    StructuringError::ModelUnavailable(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    StructuringError::ModelUnavailable(format!(
                        "cannot reach model server at {}",
                        self.base_url
                    ))
                } else {
                    StructuringError::ModelUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::ModelUnavailable(format!(
                "server returned {status}: {}",
                body.trim()
            )));
        }

        let chat: ChatResponse = response.json().map_err(|e| {
            StructuringError::ModelUnavailable(format!("invalid response body: {e}"))
        })?;

        debug!(response_chars = chat.message.content.len(), "Chat response received");
        Ok(chat.message.content)
    }
}

/// Mock client returning a fixed response and counting calls.
pub struct MockLlmClient {
    response: String,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl LlmClient for MockLlmClient {
    fn chat(&self, _model: &str, _prompt: &str) -> Result<String, StructuringError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/", 30);
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn mock_counts_calls() {
        let mock = MockLlmClient::new("{}");
        assert_eq!(mock.call_count(), 0);
        mock.chat("m", "p").unwrap();
        mock.chat("m", "p").unwrap();
        assert_eq!(mock.call_count(), 2);
    }
}
