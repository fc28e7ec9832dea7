//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::EpisodeStore;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let store = EpisodeStore::from_settings(&settings)?;

    match store.list_episodes() {
        Ok(episodes) => {
            if episodes.is_empty() {
                Output::info("No episodes yet. Use 'woohoo generate <title> -s <file>' to make one.");
            } else {
                Output::header(&format!("Episodes ({})", episodes.len()));
                println!();

                for episode in &episodes {
                    Output::episode_line(episode);
                }

                let minutes: u32 = episodes.iter().map(|e| e.duration_minutes).sum();
                println!();
                Output::kv("Total episodes", &episodes.len().to_string());
                Output::kv("Total listening time", &format!("{} min", minutes));
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list episodes: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
