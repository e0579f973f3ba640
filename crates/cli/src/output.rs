//! Terminal output utilities
//!
//! Human-readable messages go through [`Status`]; machine-readable output
//! goes through [`print_json`]. Warnings and errors always use stderr so
//! JSON on stdout stays parseable.

use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt;

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured, human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

impl OutputFormat {
    /// True for [`OutputFormat::Json`]
    pub fn is_json(self) -> bool {
        self == Self::Json
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print an aligned `label: value` line
    pub fn field(label: &str, value: impl fmt::Display) {
        println!("  {:<12} {}", format!("{label}:").dimmed(), value);
    }
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format an elapsed duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{mins}m {remaining_secs:.0}s")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Format an optional distance, `-` when unknown
pub fn format_km(km: Option<f64>) -> String {
    km.map_or_else(|| "-".to_string(), |km| format!("{km:.2} km"))
}

/// Format an optional rating, `-` when unrated
pub fn format_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| "-".to_string(), |r| format!("★ {r:.1}"))
}

/// Shorten `text` to `max` characters, marking the cut with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
