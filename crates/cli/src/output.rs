//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use droidplan_core::error::Error;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Output format for commands that print a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
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

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print a `key: value` row aligned to `width`
    pub fn field(key: &str, value: impl std::fmt::Display, width: usize) {
        println!("  {:<width$} {}", format!("{}:", key).dimmed(), value, width = width + 1);
    }

    /// Print a structured error, with its suggestion if any
    pub fn report(err: &Error, format: OutputFormat) {
        match format {
            OutputFormat::Json => match serde_json::to_string_pretty(&err.to_report()) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => Self::error(&err.to_string()),
            },
            OutputFormat::Text => {
                let field = err
                    .field
                    .as_deref()
                    .map(|f| format!(" ({})", f))
                    .unwrap_or_default();
                eprintln!("{} {}{}", format!("✗ {}", err.code).red(), err.message, field.dimmed());
                if let Some(ctx) = &err.context {
                    eprintln!("  {}", ctx.dimmed());
                }
                if let Some(suggestion) = &err.suggestion {
                    eprintln!("  {} {}", "hint:".cyan(), suggestion);
                }
            }
        }
    }
}

/// Format a cache lifetime for display
pub fn format_ttl(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        "0s".to_string()
    } else if secs % 86_400 == 0 {
        format_count(usize::try_from(secs / 86_400).unwrap_or(usize::MAX), "day", "days")
    } else if secs % 3_600 == 0 {
        format_count(usize::try_from(secs / 3_600).unwrap_or(usize::MAX), "hour", "hours")
    } else if secs % 60 == 0 {
        format_count(usize::try_from(secs / 60).unwrap_or(usize::MAX), "minute", "minutes")
    } else {
        format!("{}s", secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
