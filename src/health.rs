//! Fuses the engine's lifecycle state with a log-content health signal.
//!
//! An engine can report a container as `running` while the application inside has deadlocked,
//! crashed internally or never finished starting. The most recent log line is used as a second
//! opinion: it must exist and must not look like an error for the container to count as running.
//!
//! A container that is running but has not written anything yet is reported as not running under
//! the default [`SilentLogPolicy::FailClosed`]. This is the intended heuristic; deployments with
//! quiet applications can switch to [`SilentLogPolicy::TrustEngine`].

use std::str::FromStr;

use crate::engine::LifecycleState;
use crate::logs::LogWindow;

/// Lower-case tokens that mark a log line as unhealthy.
pub const ERROR_TOKENS: [&str; 6] = [
    "working in port",
    "erro",
    "error",
    "fail",
    "exception",
    "qrreaderror",
];

/// Marker written by the application while it is still waiting to be bound to a session.
pub const NOT_STARTED_MARKER: &str = "waiting for connection";

/// Status label used when [`NOT_STARTED_MARKER`] is seen.
pub const NOT_STARTED_LABEL: &str = "Not started";

/// How to judge a log tail without any non-blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SilentLogPolicy {
    /// No log output counts as unhealthy.
    #[default]
    FailClosed,
    /// No log output defers to the engine's own state.
    TrustEngine,
}

impl FromStr for SilentLogPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-closed" => Ok(SilentLogPolicy::FailClosed),
            "trust-engine" => Ok(SilentLogPolicy::TrustEngine),
            other => Err(format!(
                "unknown policy `{other}`, expected `fail-closed` or `trust-engine`"
            )),
        }
    }
}

/// Health signal derived from the last log line alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogHealth {
    Healthy,
    /// No line to judge.
    Silent,
    /// The line matched one of [`ERROR_TOKENS`].
    Error(String),
}

impl LogHealth {
    pub fn from_last_line(line: Option<&str>) -> Self {
        let Some(line) = line.filter(|l| !l.trim().is_empty()) else {
            return LogHealth::Silent;
        };
        let lowered = line.to_lowercase();
        if ERROR_TOKENS.iter().any(|token| lowered.contains(token)) {
            LogHealth::Error(line.to_owned())
        } else {
            LogHealth::Healthy
        }
    }

    fn is_healthy(&self, policy: SilentLogPolicy) -> bool {
        match self {
            LogHealth::Healthy => true,
            LogHealth::Silent => policy == SilentLogPolicy::TrustEngine,
            LogHealth::Error(_) => false,
        }
    }
}

/// Final verdict for a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FusedState {
    /// Engine says running and the logs agree.
    Running,
    /// The application announced it is still waiting to start.
    NotStarted,
    /// The last log line looked like an error.
    Error(String),
    /// Neither signal confirms a healthy application.
    Unknown,
}

impl FusedState {
    /// `running = engine_running && log_healthy`. Non-running verdicts are refined by the error
    /// line, then by the not-started marker.
    pub fn fuse(engine_state: LifecycleState, logs: &LogWindow, policy: SilentLogPolicy) -> Self {
        let health = LogHealth::from_last_line(logs.last_line());
        let running = engine_state.is_running() && health.is_healthy(policy);
        match health {
            LogHealth::Error(line) => FusedState::Error(line),
            _ if running => FusedState::Running,
            _ if logs.contains(NOT_STARTED_MARKER) => FusedState::NotStarted,
            _ => FusedState::Unknown,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, FusedState::Running)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FusedState::Error(line) => Some(line),
            _ => None,
        }
    }
}

/// Status label shown to operators: the engine's own string unless the log tail says the
/// application has not started yet.
pub fn status_label<'a>(engine_status: &'a str, logs: &LogWindow) -> &'a str {
    if logs.contains(NOT_STARTED_MARKER) {
        NOT_STARTED_LABEL
    } else {
        engine_status
    }
}
