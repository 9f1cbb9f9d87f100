//! Mesh vertices and their identities

use crate::{color::Color, point::Point3f};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, totally ordered vertex identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for VertexId {
    fn from(index: usize) -> Self {
        VertexId(index)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mesh vertex: identity, position and color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    id: VertexId,
    pub position: Point3f,
    pub color: Color,
}

impl Vertex {
    pub fn new(id: VertexId, position: Point3f, color: Color) -> Self {
        Self { id, position, color }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn position(&self) -> &Point3f {
        &self.position
    }

    pub fn color(&self) -> &Color {
        &self.color
    }
}
