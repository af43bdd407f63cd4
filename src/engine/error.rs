/// Failures talking to the container engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to set up engine client for `{endpoint}`: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("engine request `{operation}` failed: {source}")]
    Api {
        operation: &'static str,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("no such {kind}: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("engine returned no stats for container {0}")]
    NoStats(String),
    #[error("engine did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

impl Error {
    /// Maps an engine API error, turning a 404 into [`Error::NotFound`].
    pub(crate) fn api(
        operation: &'static str,
        kind: &'static str,
        id: &str,
        source: bollard::errors::Error,
    ) -> Self {
        match source {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => Error::NotFound {
                kind,
                id: id.to_owned(),
            },
            source => Error::Api { operation, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
