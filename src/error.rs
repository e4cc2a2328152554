//! Error taxonomy for the server.
//!
//! Only [`ServerError::Bind`] and [`ServerError::InvalidRoot`] are fatal.
//! Everything else is contained inside the connection that produced it.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::parser::ParseError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server root {path} is not usable: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed request: {0}")]
    MalformedRequest(#[from] ParseError),

    #[error("path escapes the server root: {path}")]
    PathTraversalRejected { path: PathBuf },

    #[error("filesystem error on {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("worker pool saturated, dropping connection from {peer}")]
    PoolSaturated { peer: SocketAddr },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ServerError {
    /// Whether the process should terminate on this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServerError::Bind { .. } | ServerError::InvalidRoot { .. })
    }
}
