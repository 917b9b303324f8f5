use std::path::PathBuf;

use thiserror::Error;

use ax_network::NetworkError;
use ax_reduce::ReduceError;
use ax_route::RouteError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("engine configuration error: {0}")]
    Config(#[from] ax_core::CoreError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("routing error: {0}")]
    Route(#[from] RouteError),

    #[error("checkpoint/output error: {0}")]
    Reduce(#[from] ReduceError),

    /// The inputs changed between runs: the log mentions a source position
    /// that the current list does not have.
    #[error("checkpoint log references batch {logged} but only {sources} sources are queued")]
    ResumeMismatch { logged: u32, sources: usize },

    /// A shard log does not start at its shard's first batch, usually because
    /// the shard count changed between runs.
    #[error("checkpoint log {} starts at batch {logged_first}, expected {expected_first}", path.display())]
    ShardMismatch {
        path:           PathBuf,
        logged_first:   u32,
        expected_first: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BatchResult<T> = Result<T, BatchError>;
