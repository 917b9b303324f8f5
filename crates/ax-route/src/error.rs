//! Routing-subsystem error type.

use thiserror::Error;

use ax_core::NodeId;

/// Errors produced by `ax-route`.  All of them abort the category batch.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("source {id:?} is assigned node {node}, which is not in the network")]
    SourceNodeMissing { id: String, node: NodeId },

    #[error("source {id:?} has non-finite coordinates")]
    NonFiniteSource { id: String },

    #[error("target node {0} is not in the network")]
    TargetNodeMissing(NodeId),

    #[error("{0}")]
    Config(#[from] ax_core::CoreError),
}

pub type RouteResult<T> = Result<T, RouteError>;
