use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::aggregate::{Aggregator, ListMode};
use crate::engine::{self, Engine};

mod models;

pub use models::{FullContainer, LightContainer, UNKNOWN_SESSION, UsageSummary};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("container not found")]
    NotFound(#[source] engine::Error),
    #[error("container engine unavailable")]
    Engine(#[source] engine::Error),
}

impl From<engine::Error> for Error {
    fn from(err: engine::Error) -> Self {
        if err.is_not_found() {
            Error::NotFound(err)
        } else {
            Error::Engine(err)
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(err) => {
                log::debug!("{}", err);
                StatusCode::NOT_FOUND
            }
            Error::Engine(err) => {
                log::error!("request failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

type Result<T> = std::result::Result<T, Error>;

async fn list_containers<E: Engine>(
    State(aggregator): State<Aggregator<E>>,
) -> Result<Json<Vec<LightContainer>>> {
    let records = aggregator.list(ListMode::Light).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn list_containers_full<E: Engine>(
    State(aggregator): State<Aggregator<E>>,
) -> Result<Json<Vec<FullContainer>>> {
    let records = aggregator.list(ListMode::Full).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn container_summary<E: Engine>(
    State(aggregator): State<Aggregator<E>>,
    Path(id): Path<String>,
) -> Result<Json<UsageSummary>> {
    let usage = aggregator.usage(&id).await?;
    Ok(Json(usage.into()))
}

pub fn router<E: Engine>(aggregator: Aggregator<E>) -> axum::Router {
    axum::Router::new()
        .route("/docker/containers", get(list_containers::<E>))
        .route("/docker/containers/full", get(list_containers_full::<E>))
        .route(
            "/docker/containers/{id}/summary",
            get(container_summary::<E>),
        )
        .with_state(aggregator)
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new<E: Engine>(aggregator: Aggregator<E>) -> Self {
        Self {
            router: router(aggregator),
        }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router.into_make_service()).await
    }
}
