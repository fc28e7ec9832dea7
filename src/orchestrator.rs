//! Pipeline orchestrator for Woohoo.
//!
//! Coordinates the entire process from source material to a persisted episode.

use crate::config::{Prompts, Settings};
use crate::error::{Result, WoohooError};
use crate::library::{Episode, EpisodeStore, NewEpisode, AUDIO_PREFIX};
use crate::profile::Profile;
use crate::prompt::PromptBuilder;
use crate::request::{is_language_code, GenerationRequest, Script};
use crate::script::{create_script_backend, ScriptBackend, ScriptGenerator};
use crate::source::{extract_tags, normalize};
use crate::speech::{create_speech_backend, SpeechBackend, SpeechSynthesizer, VoiceOptions};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Steps of episode generation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validate,
    Normalize,
    BuildPrompt,
    GenerateScript,
    GenerateSummary,
    SynthesizeAudio,
    Persist,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Validate => "validation",
            PipelineStage::Normalize => "source normalization",
            PipelineStage::BuildPrompt => "prompt building",
            PipelineStage::GenerateScript => "script generation",
            PipelineStage::GenerateSummary => "summary generation",
            PipelineStage::SynthesizeAudio => "audio synthesis",
            PipelineStage::Persist => "persistence",
            PipelineStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// The main orchestrator for the Woohoo pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompt_builder: PromptBuilder,
    scripts: ScriptGenerator,
    speech: SpeechSynthesizer,
    library: EpisodeStore,
    profile: Option<Profile>,
}

impl Orchestrator {
    /// Create a new orchestrator with the configured backends.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?
        .with_arcs(&settings.prompts.arcs);

        let script_backend = create_script_backend(&settings.generation)?;
        let speech_backend = create_speech_backend(&settings.speech)?;

        let profile = match settings.profile_path() {
            Some(path) => {
                let profile = Profile::load(&path)?;
                info!("Using profile '{}'", profile.id);
                Some(profile)
            }
            None => None,
        };

        let orchestrator = Self::with_components(settings, prompts, script_backend, speech_backend)?
            .with_profile(profile);

        if orchestrator.settings.library.sweep_on_start {
            let min_age = orchestrator.settings.library.sweep_min_age(None);
            match orchestrator
                .library
                .sweep_orphans(&orchestrator.settings.audio_dir(), min_age)
            {
                Ok(removed) if !removed.is_empty() => {
                    info!("Swept {} orphaned audio files", removed.len())
                }
                Ok(_) => {}
                Err(e) => warn!("Orphan sweep failed: {}", e),
            }
        }

        Ok(orchestrator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        script_backend: Arc<dyn ScriptBackend>,
        speech_backend: Arc<dyn SpeechBackend>,
    ) -> Result<Self> {
        let library = EpisodeStore::from_settings(&settings)?;
        let scripts = ScriptGenerator::new(
            script_backend,
            &prompts,
            Duration::from_secs(settings.generation.timeout_seconds),
        );
        let speech = SpeechSynthesizer::new(speech_backend, &settings.speech);

        Ok(Self {
            settings,
            prompt_builder: PromptBuilder::new(prompts),
            scripts,
            speech,
            library,
            profile: None,
        })
    }

    /// Use a listener profile for language and voice defaults.
    pub fn with_profile(mut self, profile: Option<Profile>) -> Self {
        self.profile = profile;
        self
    }

    /// Get the episode library.
    pub fn library(&self) -> &EpisodeStore {
        &self.library
    }

    /// Produce and persist one episode.
    ///
    /// The caller gets either a complete episode or an error naming the stage
    /// that failed. Nothing is persisted unless every stage succeeds.
    #[instrument(skip(self, request), fields(title = %request.title, arc = %request.arc))]
    pub async fn generate_episode(&self, request: &GenerationRequest) -> Result<Episode> {
        request
            .validate()
            .map_err(|e| WoohooError::at_stage(PipelineStage::Validate, e))?;

        // Profile and settings languages bypass request validation
        let language = self.resolve_language(request);
        if !is_language_code(&language) {
            return Err(WoohooError::at_stage(
                PipelineStage::Validate,
                WoohooError::Validation(format!(
                    "language must be an ISO 639-1 code, got '{}'",
                    language
                )),
            ));
        }
        let voice = self.resolve_voice(request);

        info!("Normalizing {} sources", request.sources.len());
        let content = normalize(&request.sources);
        if content.is_empty() {
            return Err(WoohooError::at_stage(
                PipelineStage::Normalize,
                WoohooError::EmptyResult("no source contains any text".to_string()),
            ));
        }
        let tags: Vec<String> = extract_tags(&request.sources).into_iter().collect();
        debug!("Normalized content: {} chars, tags {:?}", content.len(), tags);

        let instruction = self.prompt_builder.build_episode_prompt(
            &request.arc,
            request.tone.as_str(),
            request.duration_minutes,
            &language,
        );
        if instruction.trim().is_empty() {
            return Err(WoohooError::at_stage(
                PipelineStage::BuildPrompt,
                WoohooError::EmptyResult("prompt template rendered empty".to_string()),
            ));
        }

        info!("Generating script with {}", self.scripts.backend_name());
        let script_text = self.scripts.generate_script(&content, &instruction).await;
        if script_text.is_empty() {
            return Err(WoohooError::at_stage(
                PipelineStage::GenerateScript,
                WoohooError::EmptyResult("script backend returned no script".to_string()),
            ));
        }

        info!("Generating summary");
        let summary = self.scripts.generate_summary(&script_text).await;
        if summary.is_empty() {
            return Err(WoohooError::at_stage(
                PipelineStage::GenerateSummary,
                WoohooError::EmptyResult("script backend returned no summary".to_string()),
            ));
        }

        let script = Script {
            title: request.title.trim().to_string(),
            script_text,
            summary,
            language,
            tone: request.tone,
            arc: request.arc.clone(),
        };

        let audio_path = self.new_audio_path();
        info!("Synthesizing audio with {}", self.speech.backend_name());
        let options = VoiceOptions {
            voice,
            language: Some(script.language.clone()),
        };
        if !self
            .speech
            .synthesize(&script.script_text, &audio_path, &options)
            .await
        {
            return Err(WoohooError::at_stage(
                PipelineStage::SynthesizeAudio,
                WoohooError::BackendUnavailable(format!(
                    "{} produced no audio",
                    self.speech.backend_name()
                )),
            ));
        }

        let new_episode = NewEpisode {
            title: script.title,
            script_text: script.script_text,
            audio_path: audio_path.clone(),
            summary: script.summary,
            sources: request.sources.clone(),
            tags,
            arc: script.arc,
            tone: script.tone,
            language: script.language,
            duration_minutes: request.duration_minutes,
        };

        let episode = match self.library.save_episode(new_episode) {
            Ok(episode) => episode,
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_file(&audio_path) {
                    warn!("Failed to remove orphaned audio {}: {}", audio_path.display(), cleanup);
                }
                return Err(WoohooError::at_stage(PipelineStage::Persist, e));
            }
        };

        info!("Episode {} complete ({})", episode.id, PipelineStage::Done);
        Ok(episode)
    }

    fn resolve_language(&self, request: &GenerationRequest) -> String {
        request
            .language
            .as_deref()
            .or_else(|| self.profile.as_ref().and_then(Profile::language))
            .unwrap_or(&self.settings.speech.default_language)
            .to_lowercase()
    }

    fn resolve_voice(&self, request: &GenerationRequest) -> Option<String> {
        request
            .voice
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.profile.as_ref().and_then(Profile::voice))
            .map(str::to_string)
    }

    /// `<audio_dir>/audio_<unix-timestamp>_<8 hex chars>.<ext>`
    fn new_audio_path(&self) -> PathBuf {
        let suffix = Uuid::new_v4().simple().to_string();
        self.settings.audio_dir().join(format!(
            "{}{}_{}.{}",
            AUDIO_PREFIX,
            chrono::Utc::now().timestamp(),
            &suffix[..8],
            self.speech.file_extension()
        ))
    }
}
