//! Recovers who a container is serving from what it writes to its logs.

use std::sync::LazyLock;

use regex::Regex;

/// Label used when no webhook URL appears in the logs.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// `scheme://subdomain.rest`; the first host label is the client.
static WEBHOOK_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9+.-]*://([^./\s:@?#]+)\.").expect("webhook pattern is valid")
});

/// `chatId: '5511999990000@c.us'`
static CHAT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"chatId:\s*'(\d+)@c\.us'").expect("chat id pattern is valid")
});

/// Identity recovered from a log window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerIdentity {
    pub client: String,
    pub session_id: Option<String>,
}

impl ContainerIdentity {
    pub fn extract<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            client: extract_client(lines),
            session_id: extract_session_id(lines),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Capitalised subdomain of the first webhook URL, or [`UNKNOWN_CLIENT`].
pub fn extract_client<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .find_map(|line| WEBHOOK_URL.captures(line.as_ref()))
        .map(|caps| capitalize(&caps[1]))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

/// Digits of the first `chatId: '<digits>@c.us'` tag.
pub fn extract_session_id<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines
        .iter()
        .find_map(|line| CHAT_ID.captures(line.as_ref()))
        .map(|caps| caps[1].to_owned())
}
