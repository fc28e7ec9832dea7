//! Speech synthesis for Woohoo.
//!
//! A [`SpeechBackend`] renders text into an audio file. The [`SpeechSynthesizer`]
//! client wraps it so that a synthesis either leaves a complete file at the target
//! path or no file at all, and reports the outcome as a boolean.

mod command;
mod openai;

pub use command::CommandSpeechBackend;
pub use openai::OpenAISpeechBackend;

use crate::config::{SpeechProvider, SpeechSettings};
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Prefix of in-progress audio files.
pub const TEMP_PREFIX: &str = ".woohoo-";

/// Trait for text-to-speech backends.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Extension of the files this backend produces (without the dot).
    fn file_extension(&self) -> &str;

    /// Voice presets known to this backend. Empty if it cannot enumerate them.
    fn voices(&self) -> Vec<String>;

    /// Render `text` into a new audio file at `output_path`.
    async fn render(&self, text: &str, output_path: &Path, voice: &str, language: &str)
        -> Result<()>;
}

/// Create the speech backend selected in the settings.
pub fn create_speech_backend(settings: &SpeechSettings) -> Result<Arc<dyn SpeechBackend>> {
    let backend: Arc<dyn SpeechBackend> = match settings.provider {
        SpeechProvider::OpenAI => {
            info!("Using OpenAI speech synthesis ({})", settings.model);
            Arc::new(OpenAISpeechBackend::from_settings(settings)?)
        }
        SpeechProvider::Command => {
            info!("Using command speech synthesis ({})", settings.command);
            Arc::new(CommandSpeechBackend::new(
                &settings.command,
                settings.args.clone(),
                &settings.extension,
            ))
        }
    };
    Ok(backend)
}

/// Voice and language overrides for one synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceOptions {
    pub voice: Option<String>,
    pub language: Option<String>,
}

/// Client that renders scripts to audio files.
pub struct SpeechSynthesizer {
    backend: Arc<dyn SpeechBackend>,
    default_voice: String,
    default_language: String,
    timeout: Duration,
}

impl SpeechSynthesizer {
    pub fn new(backend: Arc<dyn SpeechBackend>, settings: &SpeechSettings) -> Self {
        Self {
            backend,
            default_voice: settings.default_voice.clone(),
            default_language: settings.default_language.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }

    /// Override the render timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extension of the files the backend produces.
    pub fn file_extension(&self) -> &str {
        self.backend.file_extension()
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Voice presets of the underlying backend.
    pub fn voices(&self) -> Vec<String> {
        self.backend.voices()
    }

    /// Render `text` to `output_path`.
    ///
    /// Returns `true` only if a complete, non-empty file now exists at the path.
    /// On failure nothing is left behind.
    #[instrument(skip(self, text, options), fields(backend = %self.backend.name(), output = %output_path.display()))]
    pub async fn synthesize(&self, text: &str, output_path: &Path, options: &VoiceOptions) -> bool {
        if text.trim().is_empty() {
            warn!("Refusing to synthesize empty text");
            return false;
        }

        let voice = options
            .voice
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.default_voice);
        let language = options
            .language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_language);

        let parent = match output_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("Cannot create audio directory {}: {}", parent.display(), e);
            return false;
        }

        // Render into a sibling temp file so the final rename stays on one filesystem
        let temp = match tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&format!(".{}", self.backend.file_extension()))
            .tempfile_in(parent)
        {
            Ok(t) => t,
            Err(e) => {
                warn!("Cannot create temporary audio file: {}", e);
                return false;
            }
        };

        debug!("Rendering {} chars with voice {} ({})", text.len(), voice, language);
        let rendered = tokio::time::timeout(
            self.timeout,
            self.backend.render(text, temp.path(), voice, language),
        )
        .await;

        match rendered {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Speech synthesis failed: {}", e);
                return false;
            }
            Err(_) => {
                warn!("Speech synthesis timed out after {}s", self.timeout.as_secs());
                return false;
            }
        }

        match std::fs::metadata(temp.path()) {
            Ok(meta) if meta.len() > 0 => {}
            _ => {
                warn!("Speech backend produced no audio");
                return false;
            }
        }

        match temp.persist(output_path) {
            Ok(_) => {
                info!("Wrote audio to {}", output_path.display());
                true
            }
            Err(e) => {
                warn!("Cannot move audio into place: {}", e.error);
                false
            }
        }
    }
}

fn sentence_end() -> &'static Regex {
    static END: OnceLock<Regex> = OnceLock::new();
    END.get_or_init(|| Regex::new(r#"[.!?]+["')\]]*\s+"#).expect("sentence pattern is valid"))
}

/// Split text into pieces of at most `max_chars` characters, preferring sentence
/// boundaries, then word boundaries.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_end().find_iter(text) {
        sentences.push(&text[start..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        for part in split_long(sentence, max_chars) {
            if current.chars().count() + part.chars().count() > max_chars {
                push_piece(&mut pieces, &mut current);
            }
            current.push_str(&part);
        }
    }
    push_piece(&mut pieces, &mut current);

    pieces
}

fn push_piece(pieces: &mut Vec<String>, current: &mut String) {
    let piece = current.trim();
    if !piece.is_empty() {
        pieces.push(piece.to_string());
    }
    current.clear();
}

/// Break a single over-long sentence on whitespace, and over-long words on characters.
fn split_long(sentence: &str, max_chars: usize) -> Vec<String> {
    if sentence.chars().count() <= max_chars {
        return vec![sentence.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    for word in sentence.split_inclusive(char::is_whitespace) {
        if word.chars().count() > max_chars {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            parts.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        if current.chars().count() + word.chars().count() > max_chars {
            parts.push(std::mem::take(&mut current));
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WoohooError;
    use std::sync::Mutex;

    /// Writes the text itself as "audio" and remembers the voice it was given.
    struct EchoBackend {
        voices_seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SpeechBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        fn file_extension(&self) -> &str {
            "mp3"
        }

        fn voices(&self) -> Vec<String> {
            vec!["narrator".to_string()]
        }

        async fn render(&self, text: &str, output_path: &Path, voice: &str, language: &str) -> Result<()> {
            self.voices_seen
                .lock()
                .unwrap()
                .push((voice.to_string(), language.to_string()));
            tokio::fs::write(output_path, text).await?;
            Ok(())
        }
    }

    /// Writes half a file and then fails.
    struct BrokenBackend;

    #[async_trait]
    impl SpeechBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        fn file_extension(&self) -> &str {
            "mp3"
        }

        fn voices(&self) -> Vec<String> {
            Vec::new()
        }

        async fn render(&self, _text: &str, output_path: &Path, _voice: &str, _language: &str) -> Result<()> {
            tokio::fs::write(output_path, b"ID3 partial").await?;
            Err(WoohooError::BackendUnavailable("engine crashed".to_string()))
        }
    }

    fn synthesizer(backend: Arc<dyn SpeechBackend>) -> SpeechSynthesizer {
        SpeechSynthesizer::new(backend, &SpeechSettings::default())
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_synthesize_creates_parent_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("audio_1.mp3");
        let backend = Arc::new(EchoBackend {
            voices_seen: Mutex::new(Vec::new()),
        });

        let ok = synthesizer(backend.clone())
            .synthesize("Hello listeners.", &output, &VoiceOptions::default())
            .await;

        assert!(ok);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello listeners.");
        assert_eq!(dir_entries(output.parent().unwrap()), vec!["audio_1.mp3".to_string()]);
        assert_eq!(
            backend.voices_seen.lock().unwrap()[0],
            ("alloy".to_string(), "en".to_string())
        );
    }

    #[tokio::test]
    async fn test_voice_options_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(EchoBackend {
            voices_seen: Mutex::new(Vec::new()),
        });
        let options = VoiceOptions {
            voice: Some("nova".to_string()),
            language: Some("fr".to_string()),
        };

        assert!(synthesizer(backend.clone())
            .synthesize("Bonjour.", &dir.path().join("a.mp3"), &options)
            .await);
        assert_eq!(
            backend.voices_seen.lock().unwrap()[0],
            ("nova".to_string(), "fr".to_string())
        );
    }

    #[tokio::test]
    async fn test_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("audio_2.mp3");

        let ok = synthesizer(Arc::new(BrokenBackend))
            .synthesize("Hello.", &output, &VoiceOptions::default())
            .await;

        assert!(!ok);
        assert!(!output.exists());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("audio_3.mp3");
        let backend = Arc::new(EchoBackend {
            voices_seen: Mutex::new(Vec::new()),
        });

        assert!(!synthesizer(backend.clone())
            .synthesize(" \n", &output, &VoiceOptions::default())
            .await);
        assert!(backend.voices_seen.lock().unwrap().is_empty());
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("audio_4.wav");
        let backend = CommandSpeechBackend::new(
            "sh",
            vec![
                "-c".into(),
                "cat >/dev/null; sleep 1; echo late > \"$1\"".into(),
                "sh".into(),
                "{output}".into(),
            ],
            "wav",
        );

        let ok = synthesizer(Arc::new(backend))
            .with_timeout(Duration::from_millis(200))
            .synthesize("Hello.", &output, &VoiceOptions::default())
            .await;
        assert!(!ok);

        // Past the point where a surviving program would have written its output
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!output.exists());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_split_prefers_sentence_boundaries() {
        let text = "First sentence here. Second one! Third? Fourth sentence is longer.";
        let pieces = split_for_speech(text, 40);

        assert_eq!(
            pieces,
            vec![
                "First sentence here. Second one! Third?".to_string(),
                "Fourth sentence is longer.".to_string(),
            ]
        );
        assert!(pieces.iter().all(|p| p.chars().count() <= 40));
    }

    #[test]
    fn test_split_breaks_long_sentences_and_words() {
        let text = format!("{} tail", "x".repeat(25));
        let pieces = split_for_speech(&text, 10);

        assert!(pieces.iter().all(|p| p.chars().count() <= 10));
        assert_eq!(pieces.concat().replace(' ', ""), format!("{}tail", "x".repeat(25)));
    }

    #[test]
    fn test_split_short_text_is_single_piece() {
        assert_eq!(split_for_speech("Hi there.", 4000), vec!["Hi there.".to_string()]);
        assert!(split_for_speech("   ", 4000).is_empty());
    }
}
