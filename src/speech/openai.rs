//! OpenAI text-to-speech backend.

use super::{split_for_speech, SpeechBackend};
use crate::config::SpeechSettings;
use crate::error::{Result, WoohooError};
use crate::openai::create_client_with_timeout;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// The speech endpoint accepts at most 4096 characters per request.
const MAX_INPUT_CHARS: usize = 4000;

const VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// Speech backend using the OpenAI audio API.
///
/// Long scripts are rendered piece by piece and the MP3 streams are concatenated.
pub struct OpenAISpeechBackend {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAISpeechBackend {
    pub fn from_settings(settings: &SpeechSettings) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(Duration::from_secs(settings.timeout_seconds), None)?,
            model: settings.model.clone(),
        })
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

fn parse_voice(name: &str) -> Voice {
    match name.to_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        other => {
            warn!("Unknown OpenAI voice '{}', using alloy", other);
            Voice::Alloy
        }
    }
}

#[async_trait]
impl SpeechBackend for OpenAISpeechBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn file_extension(&self) -> &str {
        "mp3"
    }

    fn voices(&self) -> Vec<String> {
        VOICES.iter().map(|v| v.to_string()).collect()
    }

    #[instrument(skip(self, text, output_path), fields(model = %self.model))]
    async fn render(&self, text: &str, output_path: &Path, voice: &str, language: &str) -> Result<()> {
        // The endpoint detects the language from the text itself
        debug!("Rendering {} text", language);

        let pieces = split_for_speech(text, MAX_INPUT_CHARS);
        if pieces.is_empty() {
            return Err(WoohooError::EmptyResult("nothing to synthesize".to_string()));
        }

        let mut file = tokio::fs::File::create(output_path).await?;

        for (idx, piece) in pieces.iter().enumerate() {
            let request = CreateSpeechRequestArgs::default()
                .model(self.speech_model())
                .voice(parse_voice(voice))
                .input(piece.as_str())
                .response_format(SpeechResponseFormat::Mp3)
                .build()
                .map_err(|e| WoohooError::OpenAI(format!("Failed to build request: {}", e)))?;

            let response = self.client.audio().speech(request).await.map_err(|e| {
                WoohooError::BackendUnavailable(format!("OpenAI speech failed: {}", e))
            })?;

            debug!("Piece {}/{}: {} bytes", idx + 1, pieces.len(), response.bytes.len());
            file.write_all(&response.bytes).await?;
        }

        file.flush().await?;
        Ok(())
    }
}
