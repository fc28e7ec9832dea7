//! Voices command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::speech::create_speech_backend;
use anyhow::Result;

/// Run the voices command.
pub fn run_voices(settings: &Settings) -> Result<()> {
    let backend = create_speech_backend(&settings.speech)?;
    let voices = backend.voices();

    Output::header(&format!("Voices ({})", backend.name()));
    if voices.is_empty() {
        Output::info("This backend does not list its voices. Pass the voice your tool expects with --voice.");
    } else {
        for voice in &voices {
            if *voice == settings.speech.default_voice {
                Output::list_item(&format!("{} (default)", voice));
            } else {
                Output::list_item(voice);
            }
        }
    }

    Ok(())
}
