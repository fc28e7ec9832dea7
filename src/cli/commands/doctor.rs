//! Doctor command - verify system requirements and configuration.

use crate::cli::preflight::check_tool;
use crate::cli::Output;
use crate::config::{ScriptProvider, Settings, SpeechProvider};
use crate::library::EpisodeStore;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Woohoo Doctor");
    println!();
    println!("Checking backends, library and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Backends").bold());
    let backend_checks = check_backends(settings);
    for check in &backend_checks {
        check.print();
    }
    checks.extend(backend_checks);

    println!();

    println!("{}", style("Library").bold());
    let library_checks = check_library(settings);
    for check in &library_checks {
        check.print();
    }
    checks.extend(library_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(), check_profile(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before generating episodes.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Woohoo is ready to use.");
    }

    Ok(())
}

fn check_backends(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let needs_key = settings.generation.provider == ScriptProvider::OpenAI
        || settings.speech.provider == SpeechProvider::OpenAI;
    if needs_key {
        results.push(check_openai_api_key());
    }

    results.push(CheckResult::ok(
        "Script backend",
        &format!("{} ({})", settings.generation.provider, settings.generation.model),
    ));

    match settings.speech.provider {
        SpeechProvider::OpenAI => results.push(CheckResult::ok(
            "Speech backend",
            &format!("openai ({}, voice {})", settings.speech.model, settings.speech.default_voice),
        )),
        SpeechProvider::Command => {
            let program = &settings.speech.command;
            results.push(match check_tool(program) {
                Ok(()) => CheckResult::ok("Speech backend", &format!("command ({})", program)),
                Err(_) => CheckResult::error(
                    "Speech backend",
                    &format!("{} not found", program),
                    "Install it or set speech.command in the config file",
                ),
            });
        }
    }

    results
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_library(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![check_writable("Output directory", &settings.output_dir())];

    let index_path = settings.index_path();
    if !index_path.exists() {
        results.push(CheckResult::warning(
            "Episode index",
            &format!("{} (not created yet)", index_path.display()),
            "The index is created with the first episode",
        ));
        return results;
    }

    let listed = EpisodeStore::from_settings(settings).and_then(|store| store.list_episodes());
    results.push(match listed {
        Ok(episodes) => CheckResult::ok(
            "Episode index",
            &format!("{} ({} episodes)", index_path.display(), episodes.len()),
        ),
        Err(e) => CheckResult::error(
            "Episode index",
            &e.to_string(),
            "Restore the index from a backup or move it aside",
        ),
    });

    results
}

fn check_writable(name: &str, dir: &Path) -> CheckResult {
    if !dir.exists() {
        return CheckResult::warning(
            name,
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first use",
        );
    }

    match tempfile::tempfile_in(dir) {
        Ok(_) => CheckResult::ok(name, &dir.display().to_string()),
        Err(e) => CheckResult::error(
            name,
            &format!("{} is not writable: {}", dir.display(), e),
            "Fix the permissions or set general.output_dir",
        ),
    }
}

fn check_profile(settings: &Settings) -> CheckResult {
    match settings.profile_path() {
        None => CheckResult::ok("Profile", "none (using speech defaults)"),
        Some(path) if path.exists() => CheckResult::ok("Profile", &path.display().to_string()),
        Some(path) => CheckResult::error(
            "Profile",
            &format!("{} not found", path.display()),
            "Create the profile JSON or unset profile.active",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: woohoo config init",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_writable_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(check_writable("out", dir.path()).status, CheckStatus::Ok);
        assert_eq!(
            check_writable("out", &dir.path().join("missing")).status,
            CheckStatus::Warning
        );
    }

    #[test]
    fn test_corrupt_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.output_dir = dir.path().to_string_lossy().to_string();
        std::fs::write(settings.index_path(), "[oops").unwrap();

        let checks = check_library(&settings);
        assert_eq!(checks[1].status, CheckStatus::Error);
    }

    #[test]
    fn test_missing_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.data_dir = dir.path().to_string_lossy().to_string();
        settings.profile.active = Some("ghost".to_string());

        assert_eq!(check_profile(&settings).status, CheckStatus::Error);
    }
}
