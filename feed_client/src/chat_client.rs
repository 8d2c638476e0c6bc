use config_manager::{BackendConfig, ChatConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{FeedClientError, Result};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("Assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Assistant reported an error: {0}")]
    Backend(String),
    #[error("Assistant response was not understood: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body. `content` duplicates the prompt for older backends.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    content: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Relay for the backend's assistant chat endpoint.
#[derive(Clone)]
pub struct ChatClient {
    url: String,
    http_client: Client,
}

impl ChatClient {
    pub fn new(backend: &BackendConfig, chat: &ChatConfig) -> Result<Self> {
        backend
            .validate()
            .map_err(|e| FeedClientError::InvalidBaseUrl(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(chat.request_timeout_seconds))
            .build()?;

        Ok(Self {
            url: backend.endpoint(&chat.path),
            http_client,
        })
    }

    /// Send one user prompt and return the assistant's answer.
    pub async fn ask(&self, prompt: &str) -> std::result::Result<String, ChatError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let request = ChatRequest {
            content: prompt,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Relaying chat prompt ({} chars) to {}", prompt.len(), self.url);

        let response = self.http_client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let parsed = match serde_json::from_slice::<ChatResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Assistant answered HTTP {} with an unreadable body", status);
                return Err(ChatError::InvalidResponse(format!("HTTP {}: {}", status, e)));
            }
        };

        if let Some(error) = parsed.error.filter(|e| !e.trim().is_empty()) {
            return Err(ChatError::Backend(error));
        }

        match parsed.response {
            Some(answer) if status.is_success() && parsed.success && !answer.is_empty() => Ok(answer),
            _ => Err(ChatError::InvalidResponse(format!(
                "HTTP {} without an answer",
                status
            ))),
        }
    }
}
