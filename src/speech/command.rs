//! External command speech backend (piper, espeak-ng, ...).

use super::SpeechBackend;
use crate::error::{Result, WoohooError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs a local TTS program, feeding the text on stdin.
///
/// Argument templates may contain `{output}`, `{voice}` and `{language}`.
pub struct CommandSpeechBackend {
    program: String,
    args: Vec<String>,
    extension: String,
}

impl CommandSpeechBackend {
    pub fn new(program: &str, args: Vec<String>, extension: &str) -> Self {
        Self {
            program: program.to_string(),
            args,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Program this backend runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, output_path: &Path, voice: &str, language: &str) -> Vec<String> {
        let output = output_path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output)
                    .replace("{voice}", voice)
                    .replace("{language}", language)
            })
            .collect()
    }
}

#[async_trait]
impl SpeechBackend for CommandSpeechBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn file_extension(&self) -> &str {
        &self.extension
    }

    fn voices(&self) -> Vec<String> {
        Vec::new()
    }

    #[instrument(skip(self, text, output_path), fields(program = %self.program))]
    async fn render(&self, text: &str, output_path: &Path, voice: &str, language: &str) -> Result<()> {
        let args = self.expand_args(output_path, voice, language);
        debug!("Running {} {:?}", self.program, args);

        let spawned = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WoohooError::ToolNotFound(self.program.clone()));
            }
            Err(e) => {
                return Err(WoohooError::ToolFailed(format!("{} could not start: {}", self.program, e)));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits early closes the pipe; its exit status tells the story
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
            // Dropping stdin closes the pipe so the program sees EOF
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WoohooError::ToolFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_expanded() {
        let backend = CommandSpeechBackend::new(
            "espeak-ng",
            vec!["-v".into(), "{language}".into(), "-w".into(), "{output}".into(), "--voice={voice}".into()],
            ".wav",
        );

        let args = backend.expand_args(Path::new("/tmp/a.wav"), "m3", "de");
        assert_eq!(args, vec!["-v", "de", "-w", "/tmp/a.wav", "--voice=m3"]);
        assert_eq!(backend.file_extension(), "wav");
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let backend = CommandSpeechBackend::new("woohoo-no-such-tts", vec![], "wav");
        let dir = tempfile::tempdir().unwrap();

        let err = backend
            .render("hi", &dir.path().join("a.wav"), "v", "en")
            .await
            .unwrap_err();
        assert!(matches!(err, WoohooError::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_text_is_piped_to_program() {
        let backend = CommandSpeechBackend::new(
            "sh",
            vec!["-c".into(), "cat > \"$1\"".into(), "sh".into(), "{output}".into()],
            "wav",
        );
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.wav");

        backend.render("Hello there.", &output, "v", "en").await.unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello there.");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_a_failure() {
        let backend = CommandSpeechBackend::new(
            "sh",
            vec!["-c".into(), "echo boom >&2; exit 3".into()],
            "wav",
        );
        let dir = tempfile::tempdir().unwrap();

        let err = backend
            .render("hi", &dir.path().join("a.wav"), "v", "en")
            .await
            .unwrap_err();
        assert!(matches!(err, WoohooError::ToolFailed(msg) if msg.contains("boom")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timed_out_program_is_killed() {
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
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.wav");

        let rendered = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            backend.render("hi", &output, "v", "en"),
        )
        .await;
        assert!(rendered.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(!output.exists());
    }
}
