use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Transport operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
