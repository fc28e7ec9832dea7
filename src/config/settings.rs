//! Configuration settings for Woohoo.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub generation: GenerationSettings,
    pub speech: SpeechSettings,
    pub library: LibrarySettings,
    pub profile: ProfileSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for generated episodes (index, transcripts, audio, feedback).
    pub output_dir: String,
    /// Directory for application data such as profiles.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            data_dir: "data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Script generation provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScriptProvider {
    /// OpenAI chat completions (or any OpenAI-compatible server).
    #[default]
    OpenAI,
    /// A local Ollama server.
    Ollama,
}

impl std::str::FromStr for ScriptProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ScriptProvider::OpenAI),
            "ollama" => Ok(ScriptProvider::Ollama),
            _ => Err(format!("Unknown script provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ScriptProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptProvider::OpenAI => write!(f, "openai"),
            ScriptProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// Script and summary generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Backend used for script generation (openai, ollama).
    pub provider: ScriptProvider,
    /// Model name passed to the backend.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound for a single backend call.
    pub timeout_seconds: u64,
    /// Override for the OpenAI API base URL.
    pub openai_base_url: Option<String>,
    /// Base URL of the Ollama server.
    pub ollama_url: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: ScriptProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_seconds: 300,
            openai_base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Speech synthesis provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    /// OpenAI text-to-speech.
    #[default]
    OpenAI,
    /// An external command such as piper or espeak-ng.
    Command,
}

impl std::str::FromStr for SpeechProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(SpeechProvider::OpenAI),
            "command" | "local" => Ok(SpeechProvider::Command),
            _ => Err(format!("Unknown speech provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SpeechProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechProvider::OpenAI => write!(f, "openai"),
            SpeechProvider::Command => write!(f, "command"),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Backend used for synthesis (openai, command).
    pub provider: SpeechProvider,
    /// TTS model (openai provider).
    pub model: String,
    /// Voice used when neither the request nor the profile picks one.
    pub default_voice: String,
    /// Language used when neither the request nor the profile picks one.
    pub default_language: String,
    /// Upper bound for rendering one episode.
    pub timeout_seconds: u64,
    /// Program to run (command provider).
    pub command: String,
    /// Argument template (command provider). Supports {output}, {voice} and {language}.
    pub args: Vec<String>,
    /// File extension of the produced audio (command provider).
    pub extension: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::OpenAI,
            model: "tts-1".to_string(),
            default_voice: "alloy".to_string(),
            default_language: "en".to_string(),
            timeout_seconds: 900,
            command: "piper".to_string(),
            args: vec![
                "--model".to_string(),
                "{voice}".to_string(),
                "--output_file".to_string(),
                "{output}".to_string(),
            ],
            extension: "wav".to_string(),
        }
    }
}

/// Episode library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Path to the episode index. Relative paths resolve against the output directory.
    pub index_path: String,
    /// Directory for transcripts. Relative paths resolve against the output directory.
    pub transcript_dir: String,
    /// Directory for audio files. Relative paths resolve against the output directory.
    pub audio_dir: String,
    /// Remove unreferenced audio files when the pipeline starts.
    pub sweep_on_start: bool,
    /// Minimum age in minutes before an unreferenced audio file is swept.
    pub sweep_min_age_minutes: u64,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            index_path: "episode_index.json".to_string(),
            transcript_dir: ".".to_string(),
            audio_dir: ".".to_string(),
            sweep_on_start: false,
            sweep_min_age_minutes: 60,
        }
    }
}

impl LibrarySettings {
    /// Grace period before an unreferenced audio file is swept.
    ///
    /// `override_minutes` replaces the configured value; huge values saturate.
    pub fn sweep_min_age(&self, override_minutes: Option<u64>) -> Duration {
        let minutes = override_minutes.unwrap_or(self.sweep_min_age_minutes);
        Duration::from_secs(minutes.saturating_mul(60))
    }
}

/// Listener profile settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ProfileSettings {
    /// Profile id to load from `<data_dir>/profiles/<id>.json`.
    pub active: Option<String>,
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Extra learning-arc personas, keyed by arc id.
    pub arcs: BTreeMap<String, String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::WoohooError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("woohoo")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the episode index path.
    pub fn index_path(&self) -> PathBuf {
        self.resolve_output(&self.library.index_path)
    }

    /// Get the transcript directory.
    pub fn transcript_dir(&self) -> PathBuf {
        self.resolve_output(&self.library.transcript_dir)
    }

    /// Get the audio directory.
    pub fn audio_dir(&self) -> PathBuf {
        self.resolve_output(&self.library.audio_dir)
    }

    /// Get the feedback log path.
    pub fn feedback_path(&self) -> PathBuf {
        self.output_dir().join("feedback.json")
    }

    /// Get the path of the active profile, if one is configured.
    pub fn profile_path(&self) -> Option<PathBuf> {
        self.profile
            .active
            .as_ref()
            .map(|id| self.data_dir().join("profiles").join(format!("{}.json", id)))
    }

    fn resolve_output(&self, path: &str) -> PathBuf {
        let expanded = Self::expand_path(path);
        if path.is_empty() || path == "." {
            self.output_dir()
        } else if expanded.is_absolute() {
            expanded
        } else {
            self.output_dir().join(expanded)
        }
    }
}
