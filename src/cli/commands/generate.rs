//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::request::{GenerationRequest, Tone};
use crate::source::{load_sources, Source};
use anyhow::{Context, Result};
use std::path::Path;

/// Options for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub title: String,
    pub sources: Vec<String>,
    pub tone: String,
    pub duration: u32,
    pub language: Option<String>,
    pub voice: Option<String>,
    pub arc: String,
    pub profile: Option<String>,
}

/// Run the generate command.
pub async fn run_generate(options: GenerateOptions, mut settings: Settings) -> Result<()> {
    if let Some(profile) = &options.profile {
        settings.profile.active = Some(profile.clone());
    }

    let tone: Tone = options.tone.parse().map_err(anyhow::Error::msg)?;

    let mut sources: Vec<Source> = Vec::new();
    for file in &options.sources {
        let path = Settings::expand_path(file);
        let loaded = load_sources(&path).with_context(|| format!("Failed to load {}", file))?;
        Output::info(&format!(
            "Loaded {} source(s) from {}",
            loaded.len(),
            display_name(&path)
        ));
        sources.extend(loaded);
    }

    let mut request = GenerationRequest::new(sources, options.title.clone())
        .with_tone(tone)
        .with_duration(options.duration)
        .with_arc(options.arc.clone());
    if let Some(language) = &options.language {
        request = request.with_language(language.clone());
    }
    if let Some(voice) = &options.voice {
        request = request.with_voice(voice.clone());
    }

    // Reject bad input before spending anything on backends
    if let Err(e) = request.validate() {
        Output::error(&e.to_string());
        return Err(e.into());
    }
    preflight::check(Operation::Generate, &settings)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Producing \"{}\"...", request.title));
    let result = orchestrator.generate_episode(&request).await;
    spinner.finish_and_clear();

    match result {
        Ok(episode) => {
            Output::success(&format!("Episode ready: {}", episode.title));
            Output::kv("Id", &episode.id);
            Output::kv("Audio", &episode.audio_path.display().to_string());
            Output::kv("Transcript", &episode.transcript_path.display().to_string());
            if !episode.tags.is_empty() {
                Output::kv("Tags", &episode.tags.join(", "));
            }
            println!();
            println!("  {}", episode.summary);
            Ok(())
        }
        Err(e) => {
            Output::error(&e.to_string());
            Err(e.into())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
