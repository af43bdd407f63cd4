//! Container Pulse: a read-only dashboard backend for a container engine.
//!
//! For every container the engine knows about it reports a fused running state (engine lifecycle
//! combined with a log-content health check), identity mined from the logs and point-in-time
//! CPU/memory utilisation. Nothing is stored between requests; every query goes to the engine.
use std::sync::Arc;

pub mod aggregate;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod image;
pub mod logs;
pub mod usage;

/// Runs the service until the HTTP server stops.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the listen address cannot be bound.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    log::debug!("Configuration: {:?}", config);

    let engine = Arc::new(engine::DockerEngine::connect(&config.engine)?);
    log::info!("Using container engine at {}", config.engine);

    let aggregator = aggregate::Aggregator::new(engine, config.aggregation);
    let api = api::APIServer::new(aggregator);
    api.listen(config.listen_addr.as_str()).await?;

    Ok(())
}
