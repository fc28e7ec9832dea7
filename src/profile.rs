//! Listener profiles.
//!
//! Profiles are read-only JSON documents. The pipeline only uses them for defaults:
//! the language and voice of an episode when the request leaves them unset.

use crate::error::{Result, WoohooError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A listener profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub interests: Vec<String>,
    pub learning_arcs: Vec<String>,
    pub language: Option<String>,
    pub voice_preference: Option<String>,
}

impl Profile {
    /// Load a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WoohooError::Config(format!("cannot read profile {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            WoohooError::Config(format!("invalid profile {}: {}", path.display(), e))
        })
    }

    /// Preferred voice. "default" means no preference.
    pub fn voice(&self) -> Option<&str> {
        self.voice_preference
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("default"))
    }

    /// Preferred language, if set.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_partial_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maya.json");
        std::fs::write(
            &path,
            r#"{"id": "maya", "language": "es", "voice_preference": "nova", "learning_arcs": ["sustainability"]}"#,
        )
        .unwrap();

        let profile = Profile::load(&path).unwrap();
        assert_eq!(profile.id, "maya");
        assert_eq!(profile.language(), Some("es"));
        assert_eq!(profile.voice(), Some("nova"));
        assert_eq!(profile.learning_arcs, vec!["sustainability"]);
        assert!(profile.interests.is_empty());
    }

    #[test]
    fn test_default_voice_means_no_preference() {
        let profile = Profile {
            voice_preference: Some("default".to_string()),
            ..Default::default()
        };
        assert_eq!(profile.voice(), None);
        assert_eq!(profile.language(), None);
    }

    #[test]
    fn test_missing_profile_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Profile::load(&dir.path().join("nobody.json"));
        assert!(matches!(result, Err(WoohooError::Config(_))));
    }
}
