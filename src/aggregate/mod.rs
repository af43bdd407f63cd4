//! Per-container fan-out over everything the engine lists.
//!
//! Each container is processed in its own task. A task that fails (engine error, stream error,
//! decode error, timeout or panic) is logged and its container is left out of the result; it
//! never fails the batch. Only the initial list call can fail a whole request.
mod record;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::AggregationConfig;
use crate::engine::{ContainerDescriptor, ContainerSummary, Engine, Error, LogOptions, Result};
use crate::error::ResultOkLogExt;
use crate::health::{FusedState, status_label};
use crate::image::{ImageResolver, ResolvedImage};
use crate::logs::{ContainerIdentity, LogWindow};
use crate::usage::{UsageReport, UsageSnapshot};

pub use record::{ContainerRecord, ContainerUsage};

/// What to gather for each container of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Inspect data and a short log tail for the fused state.
    Light,
    /// A longer log tail, identity and resolved image.
    Full,
}

pub struct Aggregator<E> {
    engine: Arc<E>,
    config: AggregationConfig,
    /// Shared by all requests, bounds the number of containers processed at once.
    permits: Arc<Semaphore>,
}

impl<E> Clone for Aggregator<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: self.config.clone(),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<E: Engine> Aggregator<E> {
    pub fn new(engine: Arc<E>, config: AggregationConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            engine,
            config,
            permits,
        }
    }

    /// Lists all containers, including stopped ones, in engine enumeration order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the engine cannot list its containers.
    pub async fn list(&self, mode: ListMode) -> Result<Vec<ContainerRecord>> {
        let containers = self.engine.list_containers(true).await?;
        log::debug!("processing {} containers ({:?})", containers.len(), mode);

        let tasks: Vec<_> = containers
            .into_iter()
            .map(|summary| {
                let id = summary.id.clone().unwrap_or_default();
                let this = self.clone();
                let task = tokio::spawn(async move { this.process(summary, mode).await });
                (id, task)
            })
            .collect();

        let mut records = Vec::with_capacity(tasks.len());
        for (id, task) in tasks {
            match task.await {
                Ok(result) => {
                    if let Some(record) = result.ok_log(format_args!("skipping container {id}"))
                    {
                        records.push(record);
                    }
                }
                Err(err) => log::error!("task for container {} did not finish: {}", id, err),
            }
        }
        Ok(records)
    }

    /// Utilisation and recent logs of one container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id and any error of the inspect call. Log and
    /// stats failures only degrade the result.
    pub async fn usage(&self, id: &str) -> Result<ContainerUsage> {
        let inspect = self.deadline(self.engine.inspect_container(id)).await?;
        let mut descriptor = ContainerDescriptor::from(inspect);
        // Callers may use a short id or a name; answer with what they asked for.
        descriptor.id = id.to_owned();
        let tail = self.config.summary_log_tail;

        let (logs, stats) = tokio::join!(
            self.deadline(self.fetch_logs(id, tail)),
            self.deadline(self.engine.container_stats(id)),
        );
        let logs = logs.unwrap_or_else(|err| {
            log::warn!("no logs for container {}: {}", id, err);
            LogWindow::default()
        });
        let (usage, read_at) = match stats {
            Ok(stats) => {
                let snapshot = UsageSnapshot::from(stats);
                (UsageReport::compute(&snapshot), snapshot.read_at)
            }
            Err(err) => {
                log::warn!("no stats for container {}: {}", id, err);
                (UsageReport::unavailable(), None)
            }
        };

        let created_at = descriptor
            .created
            .clone()
            .or(read_at)
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        Ok(ContainerUsage {
            descriptor,
            created_at,
            usage,
            logs,
        })
    }

    async fn process(&self, summary: ContainerSummary, mode: ListMode) -> Result<ContainerRecord> {
        let _permit = self.permits.acquire().await.ok();
        log::trace!("processing container {}", summary.id.as_deref().unwrap_or_default());
        match mode {
            ListMode::Light => self.deadline(self.light_record(summary)).await,
            ListMode::Full => self.deadline(self.full_record(summary)).await,
        }
    }

    async fn light_record(&self, summary: ContainerSummary) -> Result<ContainerRecord> {
        let id = summary.id.as_deref().unwrap_or_default();
        let inspect = self.engine.inspect_container(id).await?;
        let logs = self
            .fetch_logs(id, self.config.light_log_tail)
            .await?;

        let mut descriptor = ContainerDescriptor::from(inspect);
        if let Some(status) = summary.status.filter(|s| !s.is_empty()) {
            descriptor.status = status;
        }
        let image = ResolvedImage {
            name: descriptor.image.clone(),
            created_at: None,
        };
        Ok(self.assemble(descriptor, logs, image))
    }

    async fn full_record(&self, summary: ContainerSummary) -> Result<ContainerRecord> {
        let descriptor = ContainerDescriptor::from(summary);
        let resolver = ImageResolver::new(self.engine.as_ref());
        let (logs, image) = tokio::join!(
            self.fetch_logs(&descriptor.id, self.config.full_log_tail),
            resolver.resolve(&descriptor.image),
        );
        Ok(self.assemble(descriptor, logs?, image))
    }

    fn assemble(
        &self,
        descriptor: ContainerDescriptor,
        logs: LogWindow,
        image: ResolvedImage,
    ) -> ContainerRecord {
        let state = FusedState::fuse(descriptor.state, &logs, self.config.silent_log_policy);
        if let Some(line) = state.error_message() {
            log::debug!("container {} reports an error: {}", descriptor.id, line);
        }
        let status = status_label(&descriptor.status, &logs).to_owned();
        let identity = ContainerIdentity::extract(logs.lines());
        ContainerRecord {
            descriptor,
            state,
            status,
            identity,
            image,
            logs,
        }
    }

    async fn fetch_logs(&self, id: &str, tail: usize) -> Result<LogWindow> {
        let text = self
            .engine
            .container_logs(id, LogOptions::tail(tail))
            .await?;
        Ok(LogWindow::from_text(&text, tail))
    }

    /// Applies the configured per-task timeout to `fut`.
    async fn deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.config.task_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => fut.await,
        }
    }
}
