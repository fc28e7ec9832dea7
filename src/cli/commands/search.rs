//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::EpisodeStore;
use anyhow::Result;

/// Run the search command.
pub fn run_search(query: &str, settings: Settings) -> Result<()> {
    let store = EpisodeStore::from_settings(&settings)?;

    match store.search(query) {
        Ok(episodes) => {
            if episodes.is_empty() {
                Output::warning("No episodes match your query.");
            } else {
                Output::success(&format!("Found {} episodes", episodes.len()));
                println!();
                for episode in &episodes {
                    Output::episode_line(episode);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
