//! Error types for the cluster observation model.

use std::path::PathBuf;

use galena_types::NodeId;
use thiserror::Error;

/// Cluster model errors.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cluster config file missing.
    #[error("No cluster config found at {0}")]
    ConfigNotFound(PathBuf),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Semantically invalid configuration.
    #[error("Invalid cluster config: {0}")]
    InvalidConfig(String),

    /// A report arrived for a node outside the configured set.
    #[error("Node {0} is not in the configured set")]
    UnknownNode(NodeId),
}

/// Result type for cluster-model operations.
pub type Result<T> = std::result::Result<T, Error>;
