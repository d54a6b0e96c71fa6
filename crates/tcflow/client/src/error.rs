//! Client error types

use std::time::Duration;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Workspace bridge unavailable, or it rejected a token/project request
    #[error("Workspace bridge error: {0}")]
    Bridge(String),

    /// The bridge did not complete the handshake in time
    #[error("Workspace handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// A REST call was attempted before a successful bootstrap
    #[error("Client not initialized: access token or project id missing")]
    NotInitialized,

    /// Network failure reaching the REST surface
    #[error("{operation}: transport error: {source}")]
    Transport {
        /// Operation that failed
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx HTTP response
    #[error("{operation}: HTTP {status}: {body}")]
    Status {
        /// Operation that failed
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("{operation}: invalid response body: {source}")]
    Decode {
        /// Operation that failed
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Approval process step not valid in its current state
    #[error("Workflow error: {0}")]
    Workflow(String),
}

impl ClientError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Name of the REST operation that failed, if any
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
