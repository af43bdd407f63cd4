//! Bounded, sanitized log tails and the text heuristics that run over them.
mod identity;
mod sanitize;

pub use identity::{ContainerIdentity, UNKNOWN_CLIENT, extract_client, extract_session_id};
pub use sanitize::sanitize_line;

/// The last lines of a container's output, oldest first.
///
/// Lines are sanitized and blank lines are dropped, so [`LogWindow::last_line`] is always the
/// most recent line with content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogWindow {
    lines: Vec<String>,
}

impl LogWindow {
    /// Builds a window from the engine's log text, keeping at most `max_lines` of the newest
    /// lines.
    pub fn from_text(text: &str, max_lines: usize) -> Self {
        let mut lines: Vec<String> = text
            .lines()
            .map(sanitize_line)
            .filter(|line| !line.trim().is_empty())
            .collect();
        let excess = lines.len().saturating_sub(max_lines);
        lines.drain(..excess);
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn last_line(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_newest_lines() {
        let window = LogWindow::from_text("one\ntwo\nthree\nfour\n", 2);
        assert_eq!(window.lines(), ["three", "four"]);
        assert_eq!(window.last_line(), Some("four"));
    }

    #[test]
    fn test_window_drops_blank_and_sanitizes() {
        let window = LogWindow::from_text("\x1b[32mready\x1b[0m\r\n   \n\n\u{1}\u{1}\n", 10);
        assert_eq!(window.lines(), ["ready"]);
    }

    #[test]
    fn test_empty_window() {
        let window = LogWindow::from_text("", 5);
        assert!(window.is_empty());
        assert_eq!(window.last_line(), None);
    }

    #[test]
    fn test_zero_tail_is_empty() {
        assert!(LogWindow::from_text("a\nb", 0).is_empty());
    }

    #[test]
    fn test_window_strips_lone_escape_bytes() {
        let window = LogWindow::from_text("\x1bfail: boom\r\n\x1b\n", 5);
        assert_eq!(window.lines(), ["fail: boom"]);
    }
}
