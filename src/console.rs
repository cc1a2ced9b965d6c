//! Console output formatting with ANSI color support.
//!
//! Provides styled terminal output for the interactive session, with
//! automatic TTY detection and respect for the NO_COLOR environment variable.

use crate::crawler::{CrawlReport, FetchOutcome};
use crate::site::SearchHit;
use std::io::{self, IsTerminal, Write};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl Style {
    /// Returns the ANSI escape code for this style.
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Console output handler with color support detection.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console, enabling colors only on a terminal without `NO_COLOR`.
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();

        Self { colors_enabled }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        let styled = self.style(label, &[color, Style::Bold]);
        format!("[{}]", styled)
    }

    /// Prints an info message with blue `[INFO]` label.
    pub fn info(&self, message: &str) {
        println!("{} {}", self.label("INFO", Style::Blue), message);
    }

    /// Prints a success message with green `[OK]` label.
    pub fn success(&self, message: &str) {
        println!("{} {}", self.label("OK", Style::Green), message);
    }

    /// Prints a warning message with yellow `[WARN]` label.
    pub fn warning(&self, message: &str) {
        println!("{} {}", self.label("WARN", Style::Yellow), message);
    }

    /// Prints an error message with red `[ERROR]` label to stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", Style::Red), message);
    }

    /// Prints a step message with cyan `[STEP]` label.
    pub fn step(&self, message: &str) {
        println!("{} {}", self.label("STEP", Style::Cyan), message);
    }

    /// Prints a section header in magenta bold.
    pub fn section(&self, message: &str) {
        println!();
        println!("{}", self.style(message, &[Style::Magenta, Style::Bold]));
    }

    /// Prints a question without a newline and flushes so input follows it.
    pub fn prompt(&self, message: &str) {
        print!("{} ", self.style(message, &[Style::Bold]));
        let _ = io::stdout().flush();
    }

    /// Formats one search result row.
    pub fn hit_line(&self, hit: &SearchHit) -> String {
        let number = self.style(&format!("{:>3}", hit.sequence), &[Style::Cyan, Style::Bold]);
        let url = if hit.url.is_empty() {
            self.style("(no link)", &[Style::Dim])
        } else {
            self.style(&hit.url, &[Style::Dim])
        };
        format!("{}: {}  {}", number, hit.title, url)
    }

    /// Prints the search result list.
    pub fn hits(&self, hits: &[SearchHit]) {
        self.section("Search results");
        for hit in hits {
            println!("{}", self.hit_line(hit));
        }
    }

    /// Formats a per-chapter progress line like `[12/250] 0012 Title`.
    pub fn outcome_line(&self, outcome: &FetchOutcome, completed: usize, total: usize) -> String {
        let counter = format!("[{}/{}]", completed, total);
        let status = if outcome.success {
            self.style("saved", &[Style::Green])
        } else {
            self.style("failed", &[Style::Red, Style::Bold])
        };
        let mut line = format!(
            "{} {:04} {} {}",
            self.style(&counter, &[Style::Cyan]),
            outcome.sequence,
            outcome.title,
            status
        );
        if let Some(detail) = &outcome.detail {
            line.push_str(&format!(" ({})", detail));
        }
        line
    }

    /// Formats the final success/failure tally.
    pub fn tally_line(&self, report: &CrawlReport) -> String {
        format!(
            "Download finished: {} succeeded, {} failed",
            self.style(&report.succeeded().to_string(), &[Style::Green, Style::Bold]),
            self.style(&report.failed().to_string(), &[Style::Red, Style::Bold])
        )
    }

    /// Prints the tally and every failed chapter.
    pub fn report(&self, report: &CrawlReport) {
        if report.failed() == 0 {
            self.success(&self.tally_line(report));
            return;
        }

        self.warning(&self.tally_line(report));
        for failure in report.failures() {
            println!("  failed chapter: {} - {}", failure.sequence, failure.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool) -> FetchOutcome {
        FetchOutcome {
            sequence: 12,
            title: "第十二章".to_string(),
            success,
            detail: (!success).then(|| "Unexpected HTTP status: 404".to_string()),
        }
    }

    #[test]
    fn test_style_disabled() {
        let console = Console::with_colors(false);
        assert_eq!(console.style("hello", &[Style::Red]), "hello");
    }

    #[test]
    fn test_multiple_styles() {
        let console = Console::with_colors(true);
        let styled = console.style("hello", &[Style::Bold, Style::Red]);
        assert!(styled.contains("1;31"));
        assert!(styled.ends_with(RESET));
    }

    #[test]
    fn test_label() {
        assert_eq!(Console::with_colors(false).label("WARN", Style::Yellow), "[WARN]");
        let colored = Console::with_colors(true).label("INFO", Style::Blue);
        assert_eq!(colored, "[\x1b[34;1mINFO\x1b[0m]");
    }

    #[test]
    fn test_hit_line() {
        let console = Console::with_colors(false);
        let hit = SearchHit {
            sequence: 2,
            title: "遮天".to_string(),
            url: String::new(),
        };
        assert_eq!(console.hit_line(&hit), "  2: 遮天  (no link)");
    }

    #[test]
    fn test_outcome_line() {
        let console = Console::with_colors(false);
        assert_eq!(
            console.outcome_line(&outcome(true), 3, 250),
            "[3/250] 0012 第十二章 saved"
        );
        assert_eq!(
            console.outcome_line(&outcome(false), 4, 250),
            "[4/250] 0012 第十二章 failed (Unexpected HTTP status: 404)"
        );
    }

    #[test]
    fn test_tally_line() {
        let console = Console::with_colors(false);
        let report = CrawlReport::new(vec![outcome(true), outcome(false), outcome(true)]);
        assert_eq!(
            console.tally_line(&report),
            "Download finished: 2 succeeded, 1 failed"
        );
    }
}
