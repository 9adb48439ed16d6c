use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;

/// Global output format setting, fixed once at startup.
static FORMAT: OnceLock<OutputFormat> = OnceLock::new();
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_format(format: OutputFormat) {
    let _ = FORMAT.set(format);
}

pub fn format() -> OutputFormat {
    FORMAT.get().copied().unwrap_or_default()
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    matches!(format(), OutputFormat::Json)
}

/// Print a collection in the selected mode: a rounded table, one
/// tab-separated line per item, or a JSON array of the raw entities.
pub fn print_table<T, R, F, L>(items: &[T], to_row: F, to_line: L)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
    L: Fn(&T) -> String,
{
    match format() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for item in items {
                println!("{}", to_line(item));
            }
        }
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(|item| to_row(item)).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

/// Print a single item: JSON in JSON mode, the caller's rendering otherwise.
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print a status message. Suppressed by --quiet outside JSON mode.
pub fn print_message(message: &str) {
    if is_json_output() {
        let payload = serde_json::json!({ "message": message });
        println!("{payload}");
    } else if !QUIET.load(Ordering::Relaxed) {
        println!("{message}");
    }
}

/// Format status with color based on state type
pub fn status_colored(status: &str, color: Option<&str>) -> String {
    if let Some(hex) = color {
        // Parse hex color and apply
        if let Ok((r, g, b)) = parse_hex_color(hex) {
            return status.truecolor(r, g, b).to_string();
        }
    }

    // Fallback colors based on status name
    let lower = status.to_lowercase();
    if lower.contains("done") || lower.contains("complete") || lower.contains("closed") {
        status.green().to_string()
    } else if lower.contains("progress") || lower.contains("started") {
        status.blue().to_string()
    } else if lower.contains("review") {
        status.magenta().to_string()
    } else if lower.contains("blocked") || lower.contains("canceled") || lower.contains("cancelled")
    {
        status.red().to_string()
    } else if lower.contains("backlog") || lower.contains("triage") {
        status.bright_black().to_string()
    } else {
        status.to_string()
    }
}

fn parse_hex_color(hex: &str) -> Result<(u8, u8, u8), ()> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Err(());
    }
    let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| ())?;
    let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| ())?;
    let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| ())?;
    Ok((r, g, b))
}

/// Format a date string nicely using chrono
pub fn format_date(iso: &str) -> String {
    use chrono::{DateTime, Local, Utc};

    if let Ok(dt) = iso.parse::<DateTime<Utc>>() {
        let local: DateTime<Local> = dt.into();
        local.format("%Y-%m-%d %H:%M").to_string()
    } else {
        // Fallback: just extract date portion
        iso.split('T').next().unwrap_or(iso).to_string()
    }
}

/// Format a date string as date only
pub fn format_date_only(iso: &str) -> String {
    use chrono::{DateTime, Utc};

    if let Ok(dt) = iso.parse::<DateTime<Utc>>() {
        dt.format("%Y-%m-%d").to_string()
    } else {
        iso.split('T').next().unwrap_or(iso).to_string()
    }
}

/// Format a relative time (e.g., "2 days ago")
pub fn format_relative(iso: &str) -> String {
    use chrono::{DateTime, Utc};

    if let Ok(dt) = iso.parse::<DateTime<Utc>>() {
        let now = Utc::now();
        let diff = now.signed_duration_since(dt);

        if diff.num_seconds() < 60 {
            "just now".to_string()
        } else if diff.num_minutes() < 60 {
            let mins = diff.num_minutes();
            format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
        } else if diff.num_hours() < 24 {
            let hours = diff.num_hours();
            format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
        } else if diff.num_days() < 30 {
            let days = diff.num_days();
            format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
        } else {
            format_date_only(iso)
        }
    } else {
        iso.split('T').next().unwrap_or(iso).to_string()
    }
}

/// Truncate a string with ellipsis. Counts chars, not bytes, so multi-byte
/// titles never split mid-character.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_string_gets_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("日本語のタイトルです", 8), "日本語のタ...");
        assert_eq!(truncate("🐛 bug in login flow", 10), "🐛 bug i...");
        assert_eq!(truncate("日本語", 8), "日本語");
    }

    #[test]
    fn format_date_only_extracts_date() {
        assert_eq!(format_date_only("2026-03-14T09:26:53.000Z"), "2026-03-14");
    }

    #[test]
    fn format_date_only_falls_back_on_garbage() {
        assert_eq!(format_date_only("not-a-date"), "not-a-date");
    }

    #[test]
    fn parse_hex_color_valid() {
        assert_eq!(parse_hex_color("#4ea7fc"), Ok((0x4e, 0xa7, 0xfc)));
        assert_eq!(parse_hex_color("4ea7fc"), Ok((0x4e, 0xa7, 0xfc)));
    }

    #[test]
    fn parse_hex_color_rejects_bad_input() {
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("zzzzzz").is_err());
    }
}
