//! Sweep command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::EpisodeStore;
use anyhow::Result;

/// Run the sweep command.
pub fn run_sweep(min_age_minutes: Option<u64>, settings: Settings) -> Result<()> {
    let store = EpisodeStore::from_settings(&settings)?;
    let min_age = settings.library.sweep_min_age(min_age_minutes);
    let audio_dir = settings.audio_dir();

    let removed = store.sweep_orphans(&audio_dir, min_age)?;

    if removed.is_empty() {
        Output::info(&format!("No orphaned audio in {}", audio_dir.display()));
    } else {
        for path in &removed {
            Output::list_item(&path.display().to_string());
        }
        Output::success(&format!("Removed {} orphaned audio file(s)", removed.len()));
    }

    Ok(())
}
