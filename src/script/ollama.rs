//! Ollama chat backend.

use super::{ChatMessage, ScriptBackend};
use crate::error::{Result, WoohooError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// Script backend talking to a local Ollama server over `/api/chat`.
pub struct OllamaScriptBackend {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaScriptBackend {
    /// Create a backend for `model` on the server at `base_url`.
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| WoohooError::Config(format!("Invalid Ollama URL '{}': {}", base_url, e)))?;
        let endpoint = base
            .join("api/chat")
            .map_err(|e| WoohooError::Config(format!("Invalid Ollama URL '{}': {}", base_url, e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ScriptBackend for OllamaScriptBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, messages), fields(model = %self.model, count = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| WoohooError::BackendUnavailable(format!("Ollama unreachable: {}", e)))?;

        let status = response.status();
        let body: ChatResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(WoohooError::BackendUnavailable(format!(
                "Ollama error ({}): {}",
                status, error
            )));
        }
        if !status.is_success() {
            return Err(WoohooError::BackendUnavailable(format!(
                "Ollama returned {}",
                status
            )));
        }

        let text = body.message.map(|m| m.content).unwrap_or_default();
        debug!("Received {} chars from {}", text.len(), self.model);
        Ok(text)
    }
}
