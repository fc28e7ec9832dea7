//! Generation requests and the scripts they produce.

use crate::error::{Result, WoohooError};
use crate::source::Source;
use serde::{Deserialize, Serialize};

/// Maximum number of sources per episode.
pub const MAX_SOURCES: usize = 3;
/// Shortest episode, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 5;
/// Longest episode, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 30;

/// Narration tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Journalistic,
    Casual,
    Professional,
    Enthusiastic,
    Academic,
    Youth,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::Journalistic,
        Tone::Casual,
        Tone::Professional,
        Tone::Enthusiastic,
        Tone::Academic,
        Tone::Youth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Journalistic => "journalistic",
            Tone::Casual => "casual",
            Tone::Professional => "professional",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Academic => "academic",
            Tone::Youth => "youth",
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Tone::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown tone: {}", s))
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything needed to produce one episode.
///
/// `language` and `voice` are optional; unset values fall back to the listener
/// profile and then to the speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub sources: Vec<Source>,
    pub title: String,
    pub tone: Tone,
    pub duration_minutes: u32,
    pub language: Option<String>,
    pub voice: Option<String>,
    pub arc: String,
}

impl GenerationRequest {
    /// Create a request with default tone, a 15 minute target and the general arc.
    pub fn new(sources: Vec<Source>, title: impl Into<String>) -> Self {
        Self {
            sources,
            title: title.into(),
            tone: Tone::default(),
            duration_minutes: 15,
            language: None,
            voice: None,
            arc: "general".to_string(),
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_arc(mut self, arc: impl Into<String>) -> Self {
        self.arc = arc.into();
        self
    }

    /// Check the request before any backend is contacted.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(WoohooError::Validation("at least one source is required".into()));
        }
        if self.sources.len() > MAX_SOURCES {
            return Err(WoohooError::Validation(format!(
                "at most {} sources are supported, got {}",
                MAX_SOURCES,
                self.sources.len()
            )));
        }
        if self.title.trim().is_empty() {
            return Err(WoohooError::Validation("episode title must not be empty".into()));
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(WoohooError::Validation(format!(
                "duration must be between {} and {} minutes, got {}",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, self.duration_minutes
            )));
        }
        if let Some(language) = &self.language {
            if !is_language_code(language) {
                return Err(WoohooError::Validation(format!(
                    "language must be an ISO 639-1 code, got '{}'",
                    language
                )));
            }
        }
        if self.arc.trim().is_empty() {
            return Err(WoohooError::Validation("learning arc must not be empty".into()));
        }
        Ok(())
    }
}

/// Two ASCII letters, e.g. "en" or "DE".
pub fn is_language_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// A generated narration script. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub title: String,
    pub script_text: String,
    pub summary: String,
    pub language: String,
    pub tone: Tone,
    pub arc: String,
}
