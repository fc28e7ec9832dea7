//! Rate command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::WoohooError;
use crate::library::{EpisodeStore, FeedbackLog};
use anyhow::Result;

/// Run the rate command.
pub fn run_rate(id: &str, rating: u8, notes: &str, settings: Settings) -> Result<()> {
    let store = EpisodeStore::from_settings(&settings)?;
    if store.get_episode(id)?.is_none() {
        return Err(WoohooError::EpisodeNotFound(id.to_string()).into());
    }

    let log = FeedbackLog::new(&settings.feedback_path());
    let entry = log.add_feedback(id, rating, notes)?;

    Output::success(&format!("Rated {} with {}/5", entry.episode_id, entry.rating));
    Ok(())
}
