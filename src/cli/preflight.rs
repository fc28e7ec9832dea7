//! Pre-flight checks before expensive operations.
//!
//! Validates that the configured backends are usable before starting a
//! generation that would otherwise fail midway.

use crate::config::{ScriptProvider, Settings, SpeechProvider};
use crate::error::{Result, WoohooError};
use crate::openai::is_api_key_configured;
use std::process::{Command, Stdio};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Generation needs both backends.
    Generate,
    /// Browsing the library needs nothing external.
    Browse,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Generate => {
            let needs_key = settings.generation.provider == ScriptProvider::OpenAI
                || settings.speech.provider == SpeechProvider::OpenAI;
            if needs_key {
                check_api_key()?;
            }
            if settings.speech.provider == SpeechProvider::Command {
                check_tool(&settings.speech.command)?;
            }
        }
        Operation::Browse => {}
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(WoohooError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

/// Check that an external program can be started.
pub(crate) fn check_tool(name: &str) -> Result<()> {
    match Command::new(name)
        .arg("--help")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        // Some TTS tools exit non-zero on --help; starting at all is enough
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(WoohooError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(WoohooError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_has_no_requirements() {
        assert!(check(Operation::Browse, &Settings::default()).is_ok());
    }

    #[test]
    fn test_missing_command_backend_is_reported() {
        let mut settings = Settings::default();
        settings.generation.provider = ScriptProvider::Ollama;
        settings.speech.provider = SpeechProvider::Command;
        settings.speech.command = "woohoo-no-such-tts".to_string();

        assert!(matches!(
            check(Operation::Generate, &settings),
            Err(WoohooError::ToolNotFound(_))
        ));
    }
}
