use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bollard::Docker;
use bollard::container::LogOutput;
use bollard::query_parameters::{
    InspectContainerOptions, ListContainersOptions, LogsOptions, StatsOptionsBuilder,
};
use futures::stream::StreamExt;

use super::{
    ContainerInspectResponse, ContainerStatsResponse, ContainerSummary, Engine, Error,
    ImageInspect, LogOptions, Result,
};

/// Where the engine's control API listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `host:port` reached over plain TCP.
    Tcp(String),
    /// Path of a unix domain socket.
    Unix(PathBuf),
}

impl FromStr for Endpoint {
    type Err = String;

    /// Accepts `http://host:port`, `tcp://host:port` and `unix:///path`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(format!("missing socket path in `{s}`"));
            }
            return Ok(Endpoint::Unix(PathBuf::from(path)));
        }
        let authority = s
            .strip_prefix("http://")
            .or_else(|| s.strip_prefix("tcp://"))
            .ok_or_else(|| format!("unsupported engine scheme in `{s}`"))?
            .trim_end_matches('/');
        if authority.is_empty() || authority.contains('/') {
            return Err(format!("invalid engine authority in `{s}`"));
        }
        Ok(Endpoint::Tcp(authority.to_owned()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(authority) => write!(f, "http://{authority}"),
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

/// Seconds bollard waits on a single engine request.
const CLIENT_TIMEOUT_SECS: u64 = 120;

/// Engine client backed by [`bollard::Docker`].
///
/// Connections are managed by bollard; nothing is cached or retried here.
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Sets up a client for `endpoint`. No request is made until the first call.
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        log::debug!("Connecting to {}...", endpoint);
        let docker = match endpoint {
            Endpoint::Tcp(authority) => Docker::connect_with_http(
                &format!("http://{authority}"),
                CLIENT_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            Endpoint::Unix(path) => Docker::connect_with_unix(
                &path.to_string_lossy(),
                CLIENT_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
        }
        .map_err(|source| Error::Connect {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(Self { docker })
    }
}

/// Container ids and names the engine can produce. Anything else would be spliced into the
/// request path unescaped.
fn is_container_ref(id: &str) -> bool {
    !id.is_empty()
        && !id.chars().all(|c| c == '.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Image ids and `[registry/]repo[:tag][@digest]` references.
fn is_image_ref(reference: &str) -> bool {
    !reference.is_empty()
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':' | '/' | '@'))
        && !reference
            .split('/')
            .any(|segment| segment.is_empty() || segment.chars().all(|c| c == '.'))
}

fn check_container(id: &str) -> Result<()> {
    if is_container_ref(id) {
        Ok(())
    } else {
        log::debug!("rejecting malformed container id {:?}", id);
        Err(Error::NotFound {
            kind: "container",
            id: id.to_owned(),
        })
    }
}

impl Engine for DockerEngine {
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>> {
        let options = ListContainersOptions {
            all,
            ..Default::default()
        };
        self.docker
            .list_containers(Some(options))
            .await
            .map_err(|source| Error::api("list containers", "containers", "", source))
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse> {
        check_container(id)?;
        self.docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|source| Error::api("inspect container", "container", id, source))
    }

    async fn container_logs(&self, id: &str, options: LogOptions) -> Result<String> {
        check_container(id)?;
        let options = LogsOptions {
            stdout: options.stdout,
            stderr: options.stderr,
            follow: false,
            tail: options.tail.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.logs(id, Some(options));
        let mut raw = Vec::new();
        while let Some(output) = stream.next().await {
            let output =
                output.map_err(|source| Error::api("container logs", "container", id, source))?;
            match output {
                LogOutput::StdOut { message }
                | LogOutput::StdErr { message }
                | LogOutput::Console { message }
                | LogOutput::StdIn { message } => raw.extend_from_slice(&message),
            }
        }
        // Decoded once at the end so characters split across frames survive.
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    async fn container_stats(&self, id: &str) -> Result<ContainerStatsResponse> {
        check_container(id)?;
        let options = StatsOptionsBuilder::new().stream(false).build();
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(stats) => {
                stats.map_err(|source| Error::api("container stats", "container", id, source))
            }
            None => Err(Error::NoStats(id.to_owned())),
        }
    }

    async fn inspect_image(&self, reference: &str) -> Result<ImageInspect> {
        if !is_image_ref(reference) {
            return Err(Error::NotFound {
                kind: "image",
                id: reference.to_owned(),
            });
        }
        self.docker
            .inspect_image(reference)
            .await
            .map_err(|source| Error::api("inspect image", "image", reference, source))
    }
}
