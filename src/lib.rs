//! Woohoo - Learning Podcasts from Reading Material
//!
//! A CLI tool and library that turns PDF extracts and bibliography records into
//! narrated podcast episodes, and keeps them in a searchable local library.
//!
//! # Overview
//!
//! Woohoo allows you to:
//! - Import sources from BibTeX, CSV, Zotero exports or JSON
//! - Generate a narration script and summary tuned to a tone and learning arc
//! - Render the script to audio with OpenAI or a local TTS program
//! - Browse, search and rate the resulting episodes
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `source` - Source model, normalization and bibliography import
//! - `request` - Generation requests and scripts
//! - `prompt` - Instruction building from arcs and tones
//! - `script` - Script generation backends
//! - `speech` - Speech synthesis backends
//! - `library` - Episode store and feedback log
//! - `profile` - Listener profiles
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use woohoo::config::Settings;
//! use woohoo::orchestrator::Orchestrator;
//! use woohoo::request::{GenerationRequest, Tone};
//! use woohoo::source::load_sources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let sources = load_sources(std::path::Path::new("papers.bib"))?;
//!     let request = GenerationRequest::new(sources, "Climate Update")
//!         .with_tone(Tone::Professional)
//!         .with_duration(10);
//!
//!     let episode = orchestrator.generate_episode(&request).await?;
//!     println!("Wrote {}", episode.audio_path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod openai;
pub mod orchestrator;
pub mod profile;
pub mod prompt;
pub mod request;
pub mod script;
pub mod source;
pub mod speech;

pub use error::{Result, WoohooError};
