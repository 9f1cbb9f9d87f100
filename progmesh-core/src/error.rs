//! Error types for progmesh

use crate::vertex::VertexId;
use thiserror::Error;

/// Main error type for progmesh operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Edge endpoints must be distinct vertices, got {0} twice")]
    DegenerateEdge(VertexId),

    #[error("Unknown priority policy '{0}' (expected \"shortest\" or \"color\")")]
    UnknownPolicy(String),

    #[error("Vertex {0} does not exist")]
    MissingVertex(VertexId),

    #[error("Edge {0}-{1} does not exist")]
    MissingEdge(VertexId, VertexId),

    #[error("Collapse of edge {0}-{1} is not legal")]
    IllegalCollapse(VertexId, VertexId),
}

/// Result type alias for progmesh operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownPolicy("longest".to_string());
        assert!(format!("{err}").contains("longest"));

        let err = Error::DegenerateEdge(VertexId(4));
        assert_eq!(
            format!("{err}"),
            "Edge endpoints must be distinct vertices, got 4 twice"
        );

        let err = Error::MissingEdge(VertexId(1), VertexId(9));
        assert_eq!(format!("{err}"), "Edge 1-9 does not exist");
    }
}
