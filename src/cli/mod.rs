//! CLI module for Woohoo.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Woohoo - turn reading material into podcast episodes
///
/// Feed it PDF extracts or bibliography records and it writes a narration script,
/// renders it to audio and files the episode in a searchable library.
#[derive(Parser, Debug)]
#[command(name = "woohoo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Generate an episode from up to three sources
    Generate {
        /// Episode title
        title: String,

        /// Source file (.json, .bib or .csv); repeat for more
        #[arg(short, long = "source", required = true)]
        sources: Vec<String>,

        /// Narration tone (journalistic, casual, professional, enthusiastic, academic, youth)
        #[arg(short, long, default_value = "journalistic")]
        tone: String,

        /// Target length in minutes (5-30)
        #[arg(short, long, default_value = "15")]
        duration: u32,

        /// ISO 639-1 language code (defaults to the profile, then the speech settings)
        #[arg(short, long)]
        language: Option<String>,

        /// Voice preset (defaults to the profile, then the speech settings)
        #[arg(long)]
        voice: Option<String>,

        /// Learning arc
        #[arg(short, long, default_value = "general")]
        arc: String,

        /// Listener profile id (overrides profile.active)
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// List episodes in the library
    List,

    /// Search episodes by title or tag
    Search {
        /// Search query
        query: String,
    },

    /// Show one episode
    Show {
        /// Episode id
        id: String,

        /// Print the full transcript
        #[arg(long)]
        transcript: bool,
    },

    /// Rate an episode
    Rate {
        /// Episode id
        id: String,

        /// Rating from 1 to 5
        rating: u8,

        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Remove audio files no episode refers to
    Sweep {
        /// Only remove files older than this many minutes
        #[arg(long)]
        min_age_minutes: Option<u64>,
    },

    /// List the voice presets of the configured speech backend
    Voices,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}
