//! Network-subsystem error type.

use thiserror::Error;

use ax_core::NodeId;

/// Errors produced by `ax-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {index} references missing node {node}")]
    EdgeEndpointMissing { index: usize, node: NodeId },

    #[error("edge {index} has invalid weight {value} (weights must be finite and non-negative)")]
    InvalidWeight { index: usize, value: f64 },

    #[error("point {id:?} has non-finite coordinates")]
    NonFiniteCoord { id: String },

    #[error("attachment requires k >= 1")]
    InvalidK,

    #[error("cannot attach points to an empty network")]
    EmptyNetwork,

    #[error("node ids must be dense from 0: expected {expected}, found {found}")]
    NonDenseNodeIds { expected: u32, found: u32 },

    #[error("{0}")]
    Config(#[from] ax_core::CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
