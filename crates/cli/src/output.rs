//! Terminal output utilities
//!
//! Provides the report layout used on stdout: `[=]` section headers, `- item`
//! bullets and the `(none)` placeholder. Colors are applied only when the
//! target stream supports them.

use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;
use std::io::{self, Write};

/// Printed in place of an empty list
pub const NONE: &str = "(none)";

/// Disable colors everywhere, including the progress spinner
pub fn set_color_enabled(enabled: bool) {
    if !enabled {
        owo_colors::set_override(false);
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a `[+]` progress line
    pub fn progress(message: &str) {
        println!(
            "{} {}",
            "[+]".if_supports_color(Stream::Stdout, |t| t.green()),
            message
        );
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "[!]".if_supports_color(Stream::Stderr, |t| t.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "[-]".if_supports_color(Stream::Stderr, |t| t.yellow()),
            message
        );
    }
}

/// Write a blank line followed by a `[=] title` header
pub fn write_section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{} {}",
        "[=]".if_supports_color(Stream::Stdout, |t| t.cyan()),
        title.if_supports_color(Stream::Stdout, |t| t.bold())
    )
}

/// Write `- item`
pub fn write_bullet<W: Write>(out: &mut W, item: impl Display) -> io::Result<()> {
    writeln!(out, "- {item}")
}

/// Write `* item  [TAG]`
pub fn write_marked<W: Write>(out: &mut W, item: impl Display, tag: &str) -> io::Result<()> {
    let tag = format!("[{tag}]");
    writeln!(
        out,
        "* {item}  {}",
        tag.if_supports_color(Stream::Stdout, |t| t.green())
    )
}

/// Write every item as a bullet, or the placeholder when there are none
pub fn write_list<W, I>(out: &mut W, items: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator,
    I::Item: Display,
{
    let mut empty = true;
    for item in items {
        write_bullet(out, item)?;
        empty = false;
    }
    if empty {
        writeln!(out, "{NONE}")?;
    }
    Ok(())
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        set_color_enabled(false);
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_section_header() {
        assert_eq!(render(|o| write_section(o, "APK Info")), "\n[=] APK Info\n");
    }

    #[test]
    fn test_list_with_items() {
        let text = render(|o| write_list(o, ["assets/a.png", "assets/b.json"]));
        assert_eq!(text, "- assets/a.png\n- assets/b.json\n");
    }

    #[test]
    fn test_empty_list_placeholder() {
        assert_eq!(render(|o| write_list(o, Vec::<String>::new())), "(none)\n");
    }

    #[test]
    fn test_marked_item() {
        let text = render(|o| write_marked(o, "com.example.Main", "MAIN"));
        assert_eq!(text, "* com.example.Main  [MAIN]\n");
    }

    #[test]
    fn test_format_duration_ms() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        let d = Duration::from_secs_f32(5.5);
        assert_eq!(format_duration(d), "5.5s");
    }

    #[test]
    fn test_format_duration_mins() {
        let d = Duration::from_secs(125);
        assert_eq!(format_duration(d), "2m 5s");
    }

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "DEX file", "DEX files"), "1 DEX file");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(3, "DEX file", "DEX files"), "3 DEX files");
    }
}
