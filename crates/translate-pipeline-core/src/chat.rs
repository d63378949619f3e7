//! Minimal client for OpenAI-compatible chat completion endpoints.
//!
//! Works with: llama.cpp server, Ollama, DeepSeek, OpenAI, etc. Both the
//! translation and the language-detection backends talk through this client.
//! A request is sent exactly once; failures are reported, never retried.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TranslatorConfig;
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Failure of a single chat request.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The endpoint rejected the payload as too large (HTTP 413)
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Request(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub struct ChatClient {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:8080/v1")
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    pub fn new(config: &TranslatorConfig, model: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ConfigInvalid {
                field: "translator".to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: model.unwrap_or(&config.model).to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user prompt and return the first choice's content, trimmed.
    pub async fn complete(&self, prompt: &str) -> std::result::Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: Some(0.0),
        };

        debug!("Chat request to {} (model {})", url, self.model);

        let mut req = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            if e.is_timeout() {
                ChatError::Timeout
            } else {
                ChatError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Err(ChatError::PayloadTooLarge);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("API error: {} - {}", status, body);
            return Err(ChatError::Request(format!("HTTP {status}: {body}")));
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ChatError::InvalidResponse("No choices in response".to_string()))
    }
}

/// Strip a Markdown code fence the model may have wrapped its JSON in.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop an info string such as `json` on the opening fence line
    match inner.split_once('\n') {
        Some((first, rest)) if !first.trim().starts_with('{') && !first.trim().starts_with('[') => {
            rest.trim()
        }
        _ => inner.trim(),
    }
}
