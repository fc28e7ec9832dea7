//! Error types for Woohoo.

use crate::orchestrator::PipelineStage;
use thiserror::Error;

/// Library-level error type for Woohoo operations.
#[derive(Error, Debug)]
pub enum WoohooError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend returned no usable content: {0}")]
    EmptyResult(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Episode generation failed during {stage}: {reason}")]
    Pipeline {
        stage: PipelineStage,
        #[source]
        reason: Box<WoohooError>,
    },

    #[error("Episode not found: {0}")]
    EpisodeNotFound(String),

    #[error("Unsupported source file: {0}")]
    UnsupportedSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl WoohooError {
    /// Wrap an error as a failure of the given pipeline stage.
    pub fn at_stage(stage: PipelineStage, reason: WoohooError) -> Self {
        WoohooError::Pipeline {
            stage,
            reason: Box::new(reason),
        }
    }

    /// The pipeline stage that failed, if this is a pipeline error.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            WoohooError::Pipeline { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias for Woohoo operations.
pub type Result<T> = std::result::Result<T, WoohooError>;
