//! OpenAI chat completion backend.

use super::{ChatMessage, Role, ScriptBackend};
use crate::config::GenerationSettings;
use crate::error::{Result, WoohooError};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Script backend using OpenAI chat completions.
pub struct OpenAIScriptBackend {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIScriptBackend {
    /// Create a backend from generation settings.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(
                Duration::from_secs(settings.timeout_seconds),
                settings.openai_base_url.as_deref(),
            )?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| WoohooError::OpenAI(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| WoohooError::OpenAI(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| WoohooError::OpenAI(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl ScriptBackend for OpenAIScriptBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, messages), fields(model = %self.model, count = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| WoohooError::OpenAI(format!("Failed to build request: {}", e)))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            WoohooError::BackendUnavailable(format!("OpenAI chat completion failed: {}", e))
        })?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| WoohooError::EmptyResult("OpenAI returned no choices".to_string()))?
            .clone();

        debug!("Received {} chars from {}", text.len(), self.model);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_keeps_model_settings() {
        let settings = GenerationSettings {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            ..Default::default()
        };
        let backend = OpenAIScriptBackend::from_settings(&settings).unwrap();
        assert_eq!(backend.name(), "openai");
        assert_eq!(backend.model, "gpt-4o-mini");
        assert_eq!(backend.temperature, 0.2);
    }

    #[test]
    fn test_messages_convert_for_every_role() {
        let messages = [
            ChatMessage::system("persona"),
            ChatMessage::user("content"),
            ChatMessage {
                role: Role::Assistant,
                content: "earlier reply".to_string(),
            },
        ];

        let converted: Vec<_> = messages.iter().map(to_request_message).collect();
        assert!(converted.iter().all(|m| m.is_ok()));
        assert!(matches!(
            converted[0],
            Ok(ChatCompletionRequestMessage::System(_))
        ));
        assert!(matches!(
            converted[2],
            Ok(ChatCompletionRequestMessage::Assistant(_))
        ));
    }
}
