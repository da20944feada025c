//! Error types for the exact and dynamic minimum cut algorithms

use thiserror::Error;

/// Result type for mincut operations
pub type Result<T> = std::result::Result<T, MinCutError>;

/// Errors that can occur in minimum cut operations
#[derive(Error, Debug)]
pub enum MinCutError {
    /// Graph is empty or has fewer than two vertices
    #[error("Graph is empty")]
    EmptyGraph,

    /// Invalid vertex ID
    #[error("Invalid vertex ID: {0}")]
    InvalidVertex(u64),

    /// Invalid edge
    #[error("Invalid edge: ({0}, {1})")]
    InvalidEdge(u64, u64),

    /// Edge not found
    #[error("Edge not found: ({0}, {1})")]
    EdgeNotFound(u64, u64),

    /// The graph representation does not support the requested mutation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal algorithm error
    #[error("Internal algorithm error: {0}")]
    InternalError(String),
}

impl From<serde_json::Error> for MinCutError {
    fn from(err: serde_json::Error) -> Self {
        MinCutError::SerializationError(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for MinCutError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        MinCutError::InternalError(err.to_string())
    }
}

impl MinCutError {
    /// Check if the error is recoverable
    ///
    /// Recoverable errors leave every data structure untouched, so the caller
    /// may simply continue with the next update.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MinCutError::InvalidVertex(_)
                | MinCutError::InvalidEdge(_, _)
                | MinCutError::EdgeNotFound(_, _)
                | MinCutError::InvalidParameter(_)
        )
    }

    /// Check if the error indicates a graph structure problem
    pub fn is_graph_structure_error(&self) -> bool {
        matches!(
            self,
            MinCutError::EmptyGraph
                | MinCutError::InvalidVertex(_)
                | MinCutError::InvalidEdge(_, _)
                | MinCutError::EdgeNotFound(_, _)
        )
    }

    /// Check if the error is a caller contract violation on the graph backend
    pub fn is_unsupported(&self) -> bool {
        matches!(self, MinCutError::UnsupportedOperation(_))
    }
}
