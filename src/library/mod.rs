//! Episode library for Woohoo.
//!
//! Persists finished episodes: one transcript file per episode plus a JSON index
//! of every episode record, and a feedback log for listener ratings.

mod feedback;
mod json_file;
mod store;

pub use feedback::{Feedback, FeedbackLog, MAX_RATING, MIN_RATING};
pub use store::EpisodeStore;

use crate::request::Tone;
use crate::source::Source;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name prefix of episode audio files.
pub const AUDIO_PREFIX: &str = "audio_";
/// File name prefix of transcript files.
pub const TRANSCRIPT_PREFIX: &str = "transcript_";

/// A persisted episode. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Unique identifier assigned by the store.
    pub id: String,
    pub title: String,
    pub summary: String,
    pub transcript_path: PathBuf,
    pub audio_path: PathBuf,
    pub sources: Vec<Source>,
    pub tags: Vec<String>,
    pub arc: String,
    pub tone: Tone,
    pub language: String,
    pub duration_minutes: u32,
    pub date: DateTime<Utc>,
}

impl Episode {
    /// Case-insensitive match of `query` against the title and tags.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// Everything the store needs to persist an episode.
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub title: String,
    pub script_text: String,
    pub audio_path: PathBuf,
    pub summary: String,
    pub sources: Vec<Source>,
    pub tags: Vec<String>,
    pub arc: String,
    pub tone: Tone,
    pub language: String,
    pub duration_minutes: u32,
}
