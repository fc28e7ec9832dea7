//! JSON-file episode store.

use super::json_file::{read_json_array, with_exclusive_lock, write_atomic, write_json_atomic};
use super::{Episode, NewEpisode, AUDIO_PREFIX, TRANSCRIPT_PREFIX};
use crate::config::Settings;
use crate::error::{Result, WoohooError};
use crate::speech::TEMP_PREFIX;
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Episode store backed by a JSON index and plain-text transcripts.
///
/// The store is the only authority for episode ids and index integrity.
pub struct EpisodeStore {
    index_path: PathBuf,
    transcript_dir: PathBuf,
}

impl EpisodeStore {
    /// Open a store, creating the index if it does not exist yet.
    #[instrument(skip_all)]
    pub fn new(index_path: &Path, transcript_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(transcript_dir).map_err(|e| {
            WoohooError::Persistence(format!("cannot create {}: {}", transcript_dir.display(), e))
        })?;

        if !index_path.exists() {
            with_exclusive_lock(index_path, || {
                if index_path.exists() {
                    return Ok(());
                }
                write_json_atomic(index_path, &Vec::<Episode>::new())
            })?;
        }

        info!("Opened episode index at {:?}", index_path);

        Ok(Self {
            index_path: index_path.to_path_buf(),
            transcript_dir: transcript_dir.to_path_buf(),
        })
    }

    /// Open the store configured in the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.index_path(), &settings.transcript_dir())
    }

    /// Path of the episode index.
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Persist an episode: write its transcript, then append it to the index.
    ///
    /// Either both land or neither does: if the index cannot be updated the
    /// transcript is removed again.
    #[instrument(skip(self, new), fields(title = %new.title))]
    pub fn save_episode(&self, new: NewEpisode) -> Result<Episode> {
        if new.title.trim().is_empty() {
            return Err(WoohooError::Validation("episode title must not be empty".into()));
        }
        if new.script_text.trim().is_empty() {
            return Err(WoohooError::Validation("episode transcript must not be empty".into()));
        }

        let id = Uuid::new_v4().to_string();
        let transcript_path = self
            .transcript_dir
            .join(format!("{}{}.txt", TRANSCRIPT_PREFIX, id));

        write_atomic(&transcript_path, new.script_text.as_bytes())?;
        debug!("Wrote transcript to {}", transcript_path.display());

        let episode = Episode {
            id,
            title: new.title,
            summary: new.summary,
            transcript_path: transcript_path.clone(),
            audio_path: new.audio_path,
            sources: new.sources,
            tags: new.tags,
            arc: new.arc,
            tone: new.tone,
            language: new.language,
            duration_minutes: new.duration_minutes,
            date: Utc::now(),
        };

        let appended = with_exclusive_lock(&self.index_path, || {
            let mut episodes: Vec<Episode> = read_json_array(&self.index_path)?;
            episodes.push(episode.clone());
            write_json_atomic(&self.index_path, &episodes)
        });

        if let Err(e) = appended {
            if let Err(cleanup) = std::fs::remove_file(&transcript_path) {
                warn!("Failed to remove transcript after index failure: {}", cleanup);
            }
            return Err(match e {
                WoohooError::Persistence(_) => e,
                other => WoohooError::Persistence(other.to_string()),
            });
        }

        info!("Saved episode {} ({})", episode.id, episode.title);
        Ok(episode)
    }

    /// All episodes in index order.
    pub fn list_episodes(&self) -> Result<Vec<Episode>> {
        read_json_array(&self.index_path)
    }

    /// Look up an episode by id.
    pub fn get_episode(&self, id: &str) -> Result<Option<Episode>> {
        Ok(self.list_episodes()?.into_iter().find(|e| e.id == id))
    }

    /// Episodes whose title or tags contain `query`, ignoring case.
    pub fn search(&self, query: &str) -> Result<Vec<Episode>> {
        Ok(self
            .list_episodes()?
            .into_iter()
            .filter(|e| e.matches(query))
            .collect())
    }

    /// Read the transcript of an episode.
    pub fn read_transcript(&self, episode: &Episode) -> Result<String> {
        std::fs::read_to_string(&episode.transcript_path).map_err(|e| {
            WoohooError::Persistence(format!(
                "cannot read transcript {}: {}",
                episode.transcript_path.display(),
                e
            ))
        })
    }

    /// Remove audio files in `audio_dir` that no episode references.
    ///
    /// Only files named like episode audio (or abandoned in-progress renders) and
    /// older than `min_age` are touched, so renders still in flight survive.
    #[instrument(skip(self))]
    pub fn sweep_orphans(&self, audio_dir: &Path, min_age: Duration) -> Result<Vec<PathBuf>> {
        if !audio_dir.exists() {
            return Ok(Vec::new());
        }

        with_exclusive_lock(&self.index_path, || {
            let referenced: HashSet<PathBuf> = self
                .list_episodes()?
                .into_iter()
                .filter_map(|e| e.audio_path.file_name().map(PathBuf::from))
                .collect();

            let now = SystemTime::now();
            let mut removed = Vec::new();

            for entry in std::fs::read_dir(audio_dir)?.flatten() {
                let path = entry.path();
                let Ok(meta) = entry.metadata() else { continue };
                if !meta.is_file() {
                    continue;
                }

                let name = entry.file_name();
                let name_str = name.to_string_lossy();
                let ours = name_str.starts_with(AUDIO_PREFIX)
                    || (name_str.starts_with(TEMP_PREFIX) && !name_str.ends_with(".tmp"));
                if !ours || referenced.contains(&PathBuf::from(&name)) {
                    continue;
                }

                let age = meta
                    .modified()
                    .ok()
                    .and_then(|m| now.duration_since(m).ok())
                    .unwrap_or_default();
                if age < min_age {
                    continue;
                }

                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        info!("Removed orphaned audio {}", path.display());
                        removed.push(path);
                    }
                    Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
                }
            }

            Ok(removed)
        })
    }
}
