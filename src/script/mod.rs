//! Script generation for Woohoo.
//!
//! A [`ScriptBackend`] turns role-tagged messages into free text. The
//! [`ScriptGenerator`] client builds those messages for scripts and summaries and
//! reports every failure (error, timeout, blank answer) as an empty string.

mod ollama;
mod openai;

pub use ollama::OllamaScriptBackend;
pub use openai::OpenAIScriptBackend;

use crate::config::{GenerationSettings, Prompts, ScriptProvider};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message sent to a script backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for text generation backends.
#[async_trait]
pub trait ScriptBackend: Send + Sync {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Generate a completion for the given conversation.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Create the script backend selected in the settings.
pub fn create_script_backend(settings: &GenerationSettings) -> Result<Arc<dyn ScriptBackend>> {
    let backend: Arc<dyn ScriptBackend> = match settings.provider {
        ScriptProvider::OpenAI => {
            info!("Using OpenAI script generation ({})", settings.model);
            Arc::new(OpenAIScriptBackend::from_settings(settings)?)
        }
        ScriptProvider::Ollama => {
            info!(
                "Using Ollama script generation ({} at {})",
                settings.model, settings.ollama_url
            );
            Arc::new(OllamaScriptBackend::new(&settings.ollama_url, &settings.model)?)
        }
    };
    Ok(backend)
}

/// Client that produces scripts and summaries.
pub struct ScriptGenerator {
    backend: Arc<dyn ScriptBackend>,
    script_system: String,
    summary_system: String,
    timeout: Duration,
}

impl ScriptGenerator {
    /// Create a generator using the given prompts and per-call timeout.
    pub fn new(backend: Arc<dyn ScriptBackend>, prompts: &Prompts, timeout: Duration) -> Self {
        Self {
            backend,
            script_system: prompts.script.system.clone(),
            summary_system: prompts.summary.system.clone(),
            timeout,
        }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Generate a narration script. Returns an empty string on any failure.
    #[instrument(skip_all, fields(backend = %self.backend.name(), content_len = content.len()))]
    pub async fn generate_script(&self, content: &str, instruction: &str) -> String {
        let messages = vec![
            ChatMessage::system(self.script_system.clone()),
            ChatMessage::user(format!("{}\n\n{}", instruction, content)),
        ];
        self.call("script", &messages).await
    }

    /// Summarize a script into a short blurb. Returns an empty string on any failure.
    #[instrument(skip_all, fields(backend = %self.backend.name(), script_len = script.len()))]
    pub async fn generate_summary(&self, script: &str) -> String {
        if script.trim().is_empty() {
            return String::new();
        }
        let messages = vec![
            ChatMessage::system(self.summary_system.clone()),
            ChatMessage::user(script),
        ];
        self.call("summary", &messages).await
    }

    async fn call(&self, what: &str, messages: &[ChatMessage]) -> String {
        match tokio::time::timeout(self.timeout, self.backend.complete(messages)).await {
            Ok(Ok(text)) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    warn!("{} backend returned an empty {}", self.backend.name(), what);
                } else {
                    debug!("Generated {} ({} chars)", what, text.len());
                }
                text
            }
            Ok(Err(e)) => {
                warn!("Failed to generate {}: {}", what, e);
                String::new()
            }
            Err(_) => {
                warn!(
                    "Generating {} timed out after {}s",
                    what,
                    self.timeout.as_secs()
                );
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WoohooError;
    use std::sync::Mutex;

    /// Records the messages it receives and replies with a fixed answer.
    struct RecordingBackend {
        reply: Result<String>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl RecordingBackend {
        fn replying(reply: Result<String>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScriptBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(WoohooError::BackendUnavailable(e.to_string())),
            }
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl ScriptBackend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    fn generator(backend: Arc<dyn ScriptBackend>, timeout: Duration) -> ScriptGenerator {
        ScriptGenerator::new(backend, &Prompts::default(), timeout)
    }

    #[tokio::test]
    async fn test_script_messages_combine_instruction_and_content() {
        let backend = Arc::new(RecordingBackend::replying(Ok("  Welcome!  ".to_string())));
        let scripts = generator(backend.clone(), Duration::from_secs(5));

        let script = scripts.generate_script("Source text", "Instruction").await;
        assert_eq!(script, "Welcome!");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 2);
        assert_eq!(seen[0][0].role, Role::System);
        assert_eq!(seen[0][1], ChatMessage::user("Instruction\n\nSource text"));
    }

    #[tokio::test]
    async fn test_backend_error_yields_empty_string() {
        let backend = Arc::new(RecordingBackend::replying(Err(WoohooError::BackendUnavailable(
            "connection refused".to_string(),
        ))));
        let scripts = generator(backend, Duration::from_secs(5));

        assert_eq!(scripts.generate_script("text", "instr").await, "");
        assert_eq!(scripts.generate_summary("script").await, "");
    }

    #[tokio::test]
    async fn test_summary_of_empty_script_skips_backend() {
        let backend = Arc::new(RecordingBackend::replying(Ok("summary".to_string())));
        let scripts = generator(backend.clone(), Duration::from_secs(5));

        assert_eq!(scripts.generate_summary("  ").await, "");
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_string() {
        let scripts = generator(Arc::new(SlowBackend), Duration::from_millis(20));
        assert_eq!(scripts.generate_script("text", "instr").await, "");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::system("hi")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"hi"}"#);
    }
}
