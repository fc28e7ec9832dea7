//! Show command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::WoohooError;
use crate::library::{EpisodeStore, FeedbackLog};
use anyhow::Result;

/// Run the show command.
pub fn run_show(id: &str, transcript: bool, settings: Settings) -> Result<()> {
    let store = EpisodeStore::from_settings(&settings)?;

    let episode = store
        .get_episode(id)?
        .ok_or_else(|| WoohooError::EpisodeNotFound(id.to_string()))?;

    Output::episode_details(&episode);

    let feedback = FeedbackLog::new(&settings.feedback_path()).feedback_for(&episode.id)?;
    if !feedback.is_empty() {
        let average =
            feedback.iter().map(|f| f.rating as f64).sum::<f64>() / feedback.len() as f64;
        println!();
        Output::kv(
            "Rating",
            &format!("{:.1} / 5 ({} ratings)", average, feedback.len()),
        );
        for entry in feedback.iter().filter(|f| !f.notes.is_empty()) {
            Output::list_item(&format!("{}: {}", entry.rating, entry.notes));
        }
    }

    if transcript {
        println!();
        println!("{}", store.read_transcript(&episode)?);
    }

    Ok(())
}
