//! Response bodies of the HTTP routes, each a projection of the aggregation records.
use crate::aggregate::{ContainerRecord, ContainerUsage};

/// Sentinel for a container without a recognised session.
pub const UNKNOWN_SESSION: &str = "unknown";

/// `GET /docker/containers`
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightContainer {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: &'static str,
    pub status: String,
    pub inspect_data: Option<String>,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<ContainerRecord> for LightContainer {
    fn from(value: ContainerRecord) -> Self {
        Self {
            running: value.state.is_running(),
            error_message: value.state.error_message().map(str::to_owned),
            id: value.descriptor.id,
            name: value.descriptor.name,
            image: value.descriptor.image,
            state: value.descriptor.state.as_str(),
            status: value.status,
            inspect_data: value.descriptor.created,
        }
    }
}

/// `GET /docker/containers/full`
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullContainer {
    pub id: String,
    pub name: String,
    pub image: String,
    pub image_updated_at: Option<String>,
    pub status: String,
    pub client: String,
    pub number: String,
    pub logs: Vec<String>,
}

impl From<ContainerRecord> for FullContainer {
    fn from(value: ContainerRecord) -> Self {
        Self {
            id: value.descriptor.id,
            name: value.descriptor.name,
            image: value.image.name,
            image_updated_at: value.image.created_at,
            status: value.status,
            client: value.identity.client,
            number: value
                .identity
                .session_id
                .unwrap_or_else(|| UNKNOWN_SESSION.to_owned()),
            logs: value.logs.into_lines(),
        }
    }
}

/// `GET /docker/containers/{id}/summary`
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub id: String,
    pub image: String,
    pub state: &'static str,
    pub created_at: String,
    pub cpu_percent: String,
    pub memory_usage: String,
    pub memory_limit: String,
    pub memory_percent: String,
    pub memory_available: bool,
    pub last_logs: Vec<String>,
}

impl From<ContainerUsage> for UsageSummary {
    fn from(value: ContainerUsage) -> Self {
        Self {
            cpu_percent: value.usage.cpu_percent_label(),
            memory_usage: value.usage.memory_usage_label(),
            memory_limit: value.usage.memory_limit_label(),
            memory_percent: value.usage.memory_percent_label(),
            memory_available: value.usage.memory_available(),
            id: value.descriptor.id,
            image: value.descriptor.image,
            state: value.descriptor.state.as_str(),
            created_at: value.created_at,
            last_logs: value.logs.into_lines(),
        }
    }
}
