//! CLI output formatting utilities.

use crate::library::Episode;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a one-line episode summary.
    pub fn episode_line(episode: &Episode) {
        let tags = if episode.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", episode.tags.join(", "))
        };
        println!(
            "  {} {} ({}, {}, {} min, {}){}",
            style("*").cyan(),
            style(&episode.title).bold(),
            style(&episode.id).dim(),
            episode.date.format("%Y-%m-%d"),
            episode.duration_minutes,
            episode.tone,
            style(tags).dim()
        );
        if !episode.summary.is_empty() {
            println!("    {}", content_preview(&episode.summary, 160));
        }
    }

    /// Print every field of an episode.
    pub fn episode_details(episode: &Episode) {
        Output::header(&episode.title);
        Output::kv("Id", &episode.id);
        Output::kv("Date", &episode.date.format("%Y-%m-%d %H:%M UTC").to_string());
        Output::kv("Arc", &episode.arc);
        Output::kv("Tone", episode.tone.as_str());
        Output::kv("Language", &episode.language);
        Output::kv("Length", &format!("{} min", episode.duration_minutes));
        Output::kv("Tags", &episode.tags.join(", "));
        Output::kv("Audio", &episode.audio_path.display().to_string());
        Output::kv("Transcript", &episode.transcript_path.display().to_string());
        println!();
        println!("{}", style("Sources").bold());
        for source in &episode.sources {
            Output::list_item(&format!("{} ({})", source.title(), source.kind_label()));
        }
        println!();
        println!("{}", style("Summary").bold());
        println!("  {}", episode.summary);
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Flatten to one line and truncate with an ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 20), "short text");
        assert_eq!(content_preview("ünïcödé text here", 7), "ünïcödé...");
    }
}
