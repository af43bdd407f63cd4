//! Cleanup of raw log lines before any pattern matching happens.

use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences: `ESC [`, parameter bytes, intermediate bytes, one final byte.
/// SGR colour codes (`ESC [ ... m`) are the common case.
static CSI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").expect("CSI pattern is valid")
});

/// `\u003e`-style escapes for `>`, `<` and `&`, as emitted by JSON loggers, and their HTML
/// entity spellings.
static ESCAPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\\u003e|\\u003c|\\u0026|&gt;|&lt;|&amp;").expect("escape pattern is valid")
});

fn unescape(token: &str) -> &'static str {
    match token.to_ascii_lowercase().as_str() {
        r"\u003e" | "&gt;" => ">",
        r"\u003c" | "&lt;" => "<",
        _ => "&",
    }
}

/// One left-to-right pass of all rules.
fn sanitize_once(line: &str) -> String {
    let without_csi = CSI.replace_all(line, "");
    // ESC is left alone here so a CSI sequence at the start survives for the next pass.
    let trimmed = without_csi.trim_start_matches(|c: char| c.is_ascii_control() && c != '\x1b');
    ESCAPED
        .replace_all(trimmed, |caps: &regex::Captures<'_>| unescape(&caps[0]))
        .into_owned()
}

/// Strips terminal escape sequences, normalises escaped `>`/`<`/`&` and drops leading C0
/// control bytes, ESC included.
///
/// Total and idempotent: the rules are re-applied until the line stops changing, so removing
/// one sequence can never leave a new one behind. Each changing pass shortens the line, which
/// bounds the loop.
pub fn sanitize_line(line: &str) -> String {
    let mut current = sanitize_once(line);
    loop {
        let next = sanitize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    // Any ESC still leading the line does not start a CSI sequence.
    current
        .trim_start_matches(|c: char| c.is_ascii_control())
        .to_owned()
}
