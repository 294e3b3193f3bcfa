use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP 401 — stale credentials. Fatal to the affected endpoint family
    /// for the remainder of the run, but callers catch this at the client
    /// boundary and degrade instead of aborting.
    #[error("Authorization rejected (HTTP 401)")]
    Unauthorized,

    #[error("Unexpected HTTP status {0}")]
    Api(u16),

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),

    #[error(transparent)]
    Transport(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
