//! Prompt templates for Woohoo.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub script: ScriptPrompts,
    pub summary: SummaryPrompts,
    /// Learning-arc personas.
    pub arcs: ArcPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for script generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptPrompts {
    /// System message framing the script writer.
    pub system: String,
    /// Instruction template. Receives {{persona}} and {{tone}}.
    pub instruction: String,
    /// Appended to the instruction when an episode length is known.
    /// Receives {{duration}}, {{words}} and {{language}}.
    pub episode_guidelines: String,
}

impl Default for ScriptPrompts {
    fn default() -> Self {
        Self {
            system: "You create podcast scripts from academic sources.".to_string(),

            instruction: r#"{{persona}}
Tone: {{tone}}.
Structure the script with an introduction, key ideas, example, and outro."#
                .to_string(),

            episode_guidelines: r#"Target duration: {{duration}} minutes (roughly {{words}} spoken words).
Write the script in the language with ISO 639-1 code "{{language}}".
Make complex topics accessible while keeping the sources' findings accurate.
Use conversational language, clear transitions and brief source citations.
Return only the narration text, without stage directions or speaker labels."#
                .to_string(),
        }
    }
}

/// Prompts for episode summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: "Create a brief, engaging summary of this podcast script in two or three sentences."
                .to_string(),
        }
    }
}

/// Persona descriptions for learning arcs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcPrompts {
    /// Persona used for arcs that have no entry in `personas`.
    pub fallback: String,
    /// Persona text keyed by arc id.
    pub personas: BTreeMap<String, String>,
}

impl Default for ArcPrompts {
    fn default() -> Self {
        let mut personas = BTreeMap::new();
        personas.insert(
            "civic-storyteller".to_string(),
            "You craft narratives that connect civic themes with everyday life.".to_string(),
        );
        personas.insert(
            "youth-science-explainer".to_string(),
            "You explain scientific concepts to a young audience in an accessible way.".to_string(),
        );

        Self {
            fallback: "You create engaging educational podcasts.".to_string(),
            personas,
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let script_path = custom_path.join("script.toml");
            if script_path.exists() {
                let content = std::fs::read_to_string(&script_path)?;
                prompts.script = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            // Custom arcs extend the built-in ones
            let arcs_path = custom_path.join("arcs.toml");
            if arcs_path.exists() {
                let content = std::fs::read_to_string(&arcs_path)?;
                let custom: ArcPrompts = toml::from_str(&content)?;
                prompts.arcs.fallback = custom.fallback;
                prompts.arcs.personas.extend(custom.personas);
            }
        }

        Ok(prompts)
    }

    /// Add arc personas on top of the loaded ones.
    pub fn with_arcs(mut self, arcs: &BTreeMap<String, String>) -> Self {
        self.arcs
            .personas
            .extend(arcs.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.script.system.is_empty());
        assert!(!prompts.summary.system.is_empty());
        assert!(prompts.arcs.personas.contains_key("civic-storyteller"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_arcs_extend_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("arcs.toml"),
            r#"
            fallback = "You host a friendly learning show."

            [personas]
            sustainability = "You unpack climate and sustainability research."
            "#,
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.arcs.fallback, "You host a friendly learning show.");
        assert!(prompts.arcs.personas.contains_key("sustainability"));
        assert!(prompts.arcs.personas.contains_key("youth-science-explainer"));
    }
}
