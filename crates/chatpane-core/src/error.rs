//! Error types for the chat core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::state::MessageId;

/// Failure of one round trip to the reply endpoint.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The request could not be sent or the connection broke.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("chat endpoint returned status {status}")]
    Status { status: u16 },

    /// A success response whose body was not JSON.
    #[error("could not decode reply: {0}")]
    Decode(#[from] serde_json::Error),

    /// No answer arrived in time.
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

/// Rejected typewriter reveal.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RevealError {
    #[error("message {0:?} does not exist")]
    UnknownMessage(MessageId),

    #[error("message {0:?} is already being revealed")]
    InProgress(MessageId),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown locale '{0}'")]
    UnknownLocale(String),

    #[error("min delay {min}ms exceeds max delay {max}ms")]
    DelayRange { min: u64, max: u64 },

    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}
