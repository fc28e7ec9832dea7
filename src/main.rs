//! Woohoo CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use woohoo::cli::{commands, Cli, Commands};
use woohoo::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("woohoo={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.output_dir())?;

    // Execute command
    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Generate {
            title,
            sources,
            tone,
            duration,
            language,
            voice,
            arc,
            profile,
        } => {
            let options = commands::GenerateOptions {
                title,
                sources,
                tone,
                duration,
                language,
                voice,
                arc,
                profile,
            };
            commands::run_generate(options, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings)?;
        }

        Commands::Search { query } => {
            commands::run_search(&query, settings)?;
        }

        Commands::Show { id, transcript } => {
            commands::run_show(&id, transcript, settings)?;
        }

        Commands::Rate { id, rating, notes } => {
            commands::run_rate(&id, rating, &notes, settings)?;
        }

        Commands::Sweep { min_age_minutes } => {
            commands::run_sweep(min_age_minutes, settings)?;
        }

        Commands::Voices => {
            commands::run_voices(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}
