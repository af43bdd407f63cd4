//! Engine-independent views of the engine's payloads.
//!
//! The engine is treated as untrusted input: every field bollard exposes as `Option` has a
//! fallback, and lifecycle states this crate does not know map to [`LifecycleState::Unknown`].

use bollard::models::{ContainerInspectResponse, ContainerSummary};

const UNNAMED: &str = "unnamed";
const UNKNOWN_IMAGE: &str = "unknown";

/// Lifecycle state as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    #[default]
    Unknown,
}

impl LifecycleState {
    /// Parses the engine's lowercase state name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "created" => LifecycleState::Created,
            "running" => LifecycleState::Running,
            "paused" => LifecycleState::Paused,
            "restarting" => LifecycleState::Restarting,
            "removing" => LifecycleState::Removing,
            "exited" => LifecycleState::Exited,
            "dead" => LifecycleState::Dead,
            _ => LifecycleState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Running => "running",
            LifecycleState::Paused => "paused",
            LifecycleState::Restarting => "restarting",
            LifecycleState::Removing => "removing",
            LifecycleState::Exited => "exited",
            LifecycleState::Dead => "dead",
            LifecycleState::Unknown => "unknown",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

/// Engine-independent description of a container, fetched fresh on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: LifecycleState,
    /// Human status string from the engine, e.g. `Up 3 hours`.
    pub status: String,
    /// RFC 3339 creation time, when the engine reported one.
    pub created: Option<String>,
}

fn display_name<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<String> {
    names
        .into_iter()
        .map(|name| name.trim_start_matches('/'))
        .find(|name| !name.is_empty())
        .map(str::to_owned)
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

impl From<ContainerSummary> for ContainerDescriptor {
    fn from(value: ContainerSummary) -> Self {
        let name = display_name(value.names.iter().flatten().map(String::as_str))
            .unwrap_or_else(|| UNNAMED.to_owned());
        let image = value
            .image
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(UNKNOWN_IMAGE)
            .to_owned();
        let state = value
            .state
            .map(|state| LifecycleState::from_name(&state.to_string()))
            .unwrap_or_default();
        let created = value
            .created
            .filter(|created| *created > 0)
            .and_then(|created| chrono::DateTime::from_timestamp(created, 0))
            .map(|ts| ts.to_rfc3339());
        Self {
            id: value.id.unwrap_or_default(),
            name,
            image,
            state,
            status: value.status.unwrap_or_default(),
            created,
        }
    }
}

impl From<ContainerInspectResponse> for ContainerDescriptor {
    fn from(value: ContainerInspectResponse) -> Self {
        let name = value
            .name
            .as_deref()
            .and_then(|name| display_name([name]))
            .unwrap_or_else(|| UNNAMED.to_owned());
        let image = value
            .config
            .as_ref()
            .and_then(|config| config.image.as_deref())
            .and_then(non_empty)
            .or_else(|| value.image.as_deref().and_then(non_empty))
            .unwrap_or(UNKNOWN_IMAGE)
            .to_owned();
        let state = value.state.unwrap_or_default();
        let status = state
            .status
            .map(|status| LifecycleState::from_name(&status.to_string()))
            .unwrap_or_default();
        // Older engines report `Running` without a usable `Status`.
        let lifecycle = match (status, state.running.unwrap_or(false)) {
            (LifecycleState::Unknown, true) => LifecycleState::Running,
            (status, _) => status,
        };
        Self {
            id: value.id.unwrap_or_default(),
            name,
            image,
            state: lifecycle,
            status: lifecycle.as_str().to_owned(),
            created: value.created.filter(|created| !created.is_empty()),
        }
    }
}
