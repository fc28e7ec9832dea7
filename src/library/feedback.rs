//! Listener feedback log.

use super::json_file::{read_json_array, with_exclusive_lock, write_json_atomic};
use crate::error::{Result, WoohooError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One rating of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub episode_id: String,
    pub rating: u8,
    #[serde(default)]
    pub notes: String,
    pub date: DateTime<Utc>,
}

/// Append-only JSON log of episode ratings.
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Record a rating between [`MIN_RATING`] and [`MAX_RATING`].
    pub fn add_feedback(&self, episode_id: &str, rating: u8, notes: &str) -> Result<Feedback> {
        if episode_id.trim().is_empty() {
            return Err(WoohooError::Validation("episode id must not be empty".into()));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(WoohooError::Validation(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        let entry = Feedback {
            episode_id: episode_id.to_string(),
            rating,
            notes: notes.trim().to_string(),
            date: Utc::now(),
        };

        with_exclusive_lock(&self.path, || {
            let mut entries: Vec<Feedback> = read_json_array(&self.path)?;
            entries.push(entry.clone());
            write_json_atomic(&self.path, &entries)
        })?;

        info!("Recorded rating {} for episode {}", rating, episode_id);
        Ok(entry)
    }

    /// All feedback in the order it was given.
    pub fn list(&self) -> Result<Vec<Feedback>> {
        read_json_array(&self.path)
    }

    /// Feedback for one episode.
    pub fn feedback_for(&self, episode_id: &str) -> Result<Vec<Feedback>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|f| f.episode_id == episode_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratings_are_appended_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let log = FeedbackLog::new(&dir.path().join("output").join("feedback.json"));

        log.add_feedback("ep-1", 5, " Great pacing ").unwrap();
        log.add_feedback("ep-2", 2, "").unwrap();
        log.add_feedback("ep-1", 4, "").unwrap();

        assert_eq!(log.list().unwrap().len(), 3);

        let first = log.feedback_for("ep-1").unwrap();
        assert_eq!(first.iter().map(|f| f.rating).collect::<Vec<_>>(), vec![5, 4]);
        assert_eq!(first[0].notes, "Great pacing");
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log = FeedbackLog::new(&dir.path().join("feedback.json"));

        assert!(matches!(log.add_feedback("ep-1", 0, ""), Err(WoohooError::Validation(_))));
        assert!(matches!(log.add_feedback("ep-1", 6, ""), Err(WoohooError::Validation(_))));
        assert!(log.list().unwrap().is_empty());
    }
}
