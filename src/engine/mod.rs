//! Client side of the container engine's control API.
//!
//! The [`Engine`] trait is the contract the aggregation layer consumes; [`DockerEngine`] is the
//! production implementation, backed by `bollard` against a TCP or unix-socket endpoint.
mod docker;
mod error;
pub mod models;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

pub use bollard::models::{
    ContainerInspectResponse, ContainerStatsResponse, ContainerSummary, ImageInspect,
};
pub use docker::{DockerEngine, Endpoint};
pub use error::{Error, Result};
pub use models::{ContainerDescriptor, LifecycleState};

/// Which streams to read and how many trailing lines to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub tail: usize,
    pub stdout: bool,
    pub stderr: bool,
}

impl LogOptions {
    /// Last `tail` lines of both stdout and stderr.
    pub fn tail(tail: usize) -> Self {
        Self {
            tail,
            stdout: true,
            stderr: true,
        }
    }
}

/// Read-only operations against the container engine.
///
/// Log reads never follow and stats reads are single snapshots, so every call terminates on its
/// own.
pub trait Engine: Send + Sync + 'static {
    /// Lists containers; `all` includes the ones that are not running.
    fn list_containers(&self, all: bool)
    -> impl Future<Output = Result<Vec<ContainerSummary>>> + Send;

    fn inspect_container(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ContainerInspectResponse>> + Send;

    /// Log output with stdout and stderr already demultiplexed, decoded as lossy UTF-8.
    fn container_logs(
        &self,
        id: &str,
        options: LogOptions,
    ) -> impl Future<Output = Result<String>> + Send;

    fn container_stats(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ContainerStatsResponse>> + Send;

    fn inspect_image(&self, reference: &str) -> impl Future<Output = Result<ImageInspect>> + Send;
}
