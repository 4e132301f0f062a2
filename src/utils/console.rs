// src/utils/console.rs

//! Human-facing console output with server-style formatting.
//!
//! Diagnostics go through the `log` facade; this module is only for the
//! report a CLI user reads.

use chrono::Local;

/// Format a line with timestamp and tag.
fn format_line(tag: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, tag, message)
}

/// Print a header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line("INFO", &border));
    println!("{}", format_line("INFO", &format!("  {}", title)));
    println!("{}", format_line("INFO", &border));
}

/// Print a success message.
pub fn success(message: &str) {
    println!("{}", format_line("INFO", &format!("✓ {}", message)));
}

/// Print a sub-item (indented).
pub fn sub_item(message: &str) {
    println!("{}", format_line("INFO", &format!("    {}", message)));
}

/// Print a separator line.
pub fn separator() {
    println!("{}", format_line("INFO", &"─".repeat(60)));
}

/// Print a summary section.
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("{}", format_line("SUMMARY", title));
    for (key, value) in items {
        println!("{}", format_line("SUMMARY", &format!("    {}: {}", key, value)));
    }
}

/// Shorten long text for single-line display.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_has_tag() {
        let line = format_line("SUMMARY", "pages: 3");
        assert!(line.contains("[SUMMARY] pages: 3"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("https://example.test/long", 10), "https:/...");
        assert_eq!(truncate("웹사이트분석도구", 5), "웹사...");
    }
}
