use thiserror::Error;

use rv_events::EventsError;
use rv_network::NetworkError;

#[derive(Debug, Error)]
pub enum ImportError {
    /// One message per offending configuration line.
    #[error("invalid scene configuration:\n  {}", .0.join("\n  "))]
    Config(Vec<String>),

    #[error("network: {0}")]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Events(#[from] EventsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// `true` when importing a narrower time window would succeed.
    pub fn is_resource_limit(&self) -> bool {
        matches!(self, ImportError::Events(e) if e.is_resource_limit())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
