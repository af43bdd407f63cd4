//! In-memory engine used by the aggregation and API tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;

use super::{
    ContainerInspectResponse, ContainerStatsResponse, ContainerSummary, Engine, Error,
    ImageInspect, LifecycleState, LogOptions, Result,
};

#[derive(Debug, Clone)]
pub(crate) struct FakeContainer {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: LifecycleState,
    pub status: String,
    pub logs: Vec<String>,
    pub fail_logs: bool,
    pub fail_inspect: bool,
    pub stats: Option<ContainerStatsResponse>,
    pub log_delay: Option<Duration>,
}

impl FakeContainer {
    pub fn running(id: &str, logs: &[&str]) -> Self {
        Self {
            id: id.to_owned(),
            name: format!("/{id}-name"),
            image: format!("{id}-image:latest"),
            state: LifecycleState::Running,
            status: "Up 5 minutes".to_owned(),
            logs: logs.iter().map(|line| (*line).to_owned()).collect(),
            fail_logs: false,
            fail_inspect: false,
            stats: None,
            log_delay: None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeEngine {
    pub containers: Vec<FakeContainer>,
    pub images: HashMap<String, ImageInspect>,
    pub unreachable: bool,
    /// Log reads currently in progress.
    pub in_flight: AtomicUsize,
    /// Highest value `in_flight` reached.
    pub peak: AtomicUsize,
}

impl FakeEngine {
    pub fn new(containers: Vec<FakeContainer>) -> Self {
        Self {
            containers,
            ..Default::default()
        }
    }

    /// Exact id first, then an id prefix, the way the engine resolves short ids.
    fn find(&self, id: &str) -> Result<&FakeContainer> {
        self.containers
            .iter()
            .find(|c| c.id == id)
            .or_else(|| self.containers.iter().find(|c| c.id.starts_with(id)))
            .ok_or_else(|| Error::NotFound {
                kind: "container",
                id: id.to_owned(),
            })
    }

    fn broken(&self, id: &str) -> Error {
        Error::api(
            "fake",
            "container",
            id,
            bollard::errors::Error::DockerResponseServerError {
                status_code: 500,
                message: "stream read failure".to_owned(),
            },
        )
    }
}

/// Engine state name as it appears on the wire; `Unknown` has none.
fn wire_state(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Unknown => "",
        state => state.as_str(),
    }
}

impl Engine for FakeEngine {
    async fn list_containers(&self, _all: bool) -> Result<Vec<ContainerSummary>> {
        if self.unreachable {
            return Err(Error::Api {
                operation: "list containers",
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into(),
            });
        }
        Ok(self
            .containers
            .iter()
            .map(|c| {
                serde_json::from_value(json!({
                    "Id": c.id,
                    "Names": [c.name],
                    "Image": c.image,
                    "State": wire_state(c.state),
                    "Status": c.status,
                    "Created": 1_700_000_000,
                }))
                .expect("valid container summary")
            })
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse> {
        let c = self.find(id)?;
        if c.fail_inspect {
            return Err(self.broken(id));
        }
        Ok(serde_json::from_value(json!({
            "Id": c.id,
            "Name": c.name,
            "Created": "2024-05-01T10:00:00Z",
            "Image": "sha256:feed",
            "State": {"Status": wire_state(c.state), "Running": c.state.is_running()},
            "Config": {"Image": c.image},
        }))
        .expect("valid inspect response"))
    }

    async fn container_logs(&self, id: &str, options: LogOptions) -> Result<String> {
        let c = self.find(id)?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = c.log_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if c.fail_logs {
            return Err(self.broken(id));
        }
        let skip = c.logs.len().saturating_sub(options.tail);
        let mut out = String::new();
        for line in &c.logs[skip..] {
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }

    async fn container_stats(&self, id: &str) -> Result<ContainerStatsResponse> {
        let c = self.find(id)?;
        c.stats.clone().ok_or_else(|| Error::NoStats(id.to_owned()))
    }

    async fn inspect_image(&self, reference: &str) -> Result<ImageInspect> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "image",
                id: reference.to_owned(),
            })
    }
}
