use std::io;
use thiserror::Error;

/// The primary error type for the `dmt-bridge` library.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("timeout during remote call: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("frame truncated: expected at least {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    #[error("duplicate zone mapping for variable address {0:#06x}")]
    DuplicateZone(u16),

    #[error("amplifier rejected request with code {0}")]
    RemoteCode(i64),

    #[error("unexpected response shape from amplifier")]
    ResponseShape,
}
