//! Prompt builder for script generation.
//!
//! Turns a learning arc and a tone into the instruction text that conditions
//! the script model.

use crate::config::Prompts;
use std::collections::HashMap;

/// Spoken words per minute used to size scripts.
const WORDS_PER_MINUTE: u32 = 150;

/// Builds script instructions from the configured prompt templates.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    prompts: Prompts,
}

impl PromptBuilder {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Persona text for a learning arc; unknown arcs get the fallback persona.
    ///
    /// Arc ids match exactly first, then by slug ("Civic Storyteller" finds
    /// "civic-storyteller").
    pub fn persona(&self, arc_id: &str) -> &str {
        let personas = &self.prompts.arcs.personas;
        personas
            .get(arc_id)
            .or_else(|| personas.get(&slugify(arc_id)))
            .map(String::as_str)
            .unwrap_or(&self.prompts.arcs.fallback)
    }

    /// Build the instruction for an arc and tone.
    pub fn build_prompt(&self, arc_id: &str, tone: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("persona".to_string(), self.persona(arc_id).to_string());
        vars.insert("tone".to_string(), tone.to_string());

        self.prompts
            .render_with_custom(&self.prompts.script.instruction, &vars)
    }

    /// Build the instruction for an episode, adding length and language guidelines.
    pub fn build_episode_prompt(
        &self,
        arc_id: &str,
        tone: &str,
        duration_minutes: u32,
        language: &str,
    ) -> String {
        let mut vars = HashMap::new();
        vars.insert("duration".to_string(), duration_minutes.to_string());
        vars.insert(
            "words".to_string(),
            (duration_minutes * WORDS_PER_MINUTE).to_string(),
        );
        vars.insert("language".to_string(), language.to_string());

        let guidelines = self
            .prompts
            .render_with_custom(&self.prompts.script.episode_guidelines, &vars);

        format!("{}\n{}", self.build_prompt(arc_id, tone), guidelines)
    }
}

fn slugify(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_arc_uses_persona() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_prompt("Civic Storyteller", "casual");

        assert!(prompt.starts_with("You craft narratives that connect civic themes"));
        assert!(prompt.contains("Tone: casual."));
        assert!(prompt.contains("introduction, key ideas, example, and outro"));
    }

    #[test]
    fn test_unknown_arc_falls_back() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_prompt("sustainability", "professional");

        assert!(prompt.starts_with("You create engaging educational podcasts."));
        assert!(prompt.contains("Tone: professional."));
    }

    #[test]
    fn test_episode_prompt_adds_guidelines() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_episode_prompt("youth-science-explainer", "youth", 10, "de");

        assert!(prompt.contains("Target duration: 10 minutes"));
        assert!(prompt.contains("1500 spoken words"));
        assert!(prompt.contains("\"de\""));
    }

    #[test]
    fn test_custom_variables_are_rendered() {
        let mut prompts = Prompts::default();
        prompts.script.instruction = "{{persona}} Hosted by {{host}}. Tone: {{tone}}.".to_string();
        prompts.variables.insert("host".to_string(), "Sam".to_string());

        let builder = PromptBuilder::new(prompts);
        assert!(builder.build_prompt("x", "casual").contains("Hosted by Sam."));
    }
}
