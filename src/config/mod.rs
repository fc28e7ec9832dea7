//! Configuration module for Woohoo.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ArcPrompts, Prompts, ScriptPrompts, SummaryPrompts};
pub use settings::{
    GeneralSettings, GenerationSettings, LibrarySettings, ProfileSettings, PromptSettings,
    ScriptProvider, Settings, SpeechProvider, SpeechSettings,
};
