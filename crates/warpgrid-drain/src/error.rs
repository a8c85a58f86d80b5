//! Node maintenance error types.

use thiserror::Error;
use warpgrid_state::StateError;

/// Errors that can occur while cordoning or draining a node.
#[derive(Debug, Error)]
pub enum DrainError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("the server doesn't have a resource type \"{0}\"")]
    UnknownResourceType(String),

    #[error("invalid resource name \"{0}\"")]
    InvalidName(String),

    /// Workloads without a live controller were found and `force` was not set.
    #[error(
        "refusing to continue due to workloads managed by neither a ReplicationGroup, \
         nor a Job, nor a DaemonSet: {0} (use --force to override)"
    )]
    UnmanagedWorkloads(String),

    #[error("failed to decode created-by reference of workload \"{workload}\": {source}")]
    Decode {
        workload: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any failure reported by the control plane, passed through unchanged.
    #[error(transparent)]
    State(#[from] StateError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DrainResult<T> = Result<T, DrainError>;
