//! Read-only view of the mesh that edge records query
//!
//! Edges never hold a pointer back to their mesh. Every operation that needs
//! mesh state takes a `&impl CollapseContext` instead, which also makes it
//! explicit that evaluating an edge cannot mutate the mesh.

use crate::edge::EdgeKey;
use crate::policy::PriorityPolicy;
use progmesh_core::{Error, Result, Vertex, VertexId};

/// Mesh queries consumed by [`crate::Edge`] and [`crate::CollapseQueue`].
pub trait CollapseContext {
    /// Scoring policy currently configured for this mesh.
    fn policy(&self) -> PriorityPolicy;

    /// Look up a live vertex by identity.
    fn vertex(&self, id: VertexId) -> Option<&Vertex>;

    /// Whether collapsing `edge` would keep the mesh valid. Must be pure.
    fn is_legal_collapse(&self, edge: EdgeKey) -> bool;

    /// Like [`CollapseContext::vertex`], but a missing vertex is an error.
    fn endpoint(&self, id: VertexId) -> Result<&Vertex> {
        self.vertex(id).ok_or(Error::MissingVertex(id))
    }
}
