//! Indexed triangle mesh used as simplification input and output

use crate::{
    color::Color,
    error::{Error, Result},
    point::Point3f,
    vertex::{Vertex, VertexId},
};
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            colors: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            colors: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Set vertex colors. Ignored unless there is one color per vertex.
    pub fn set_colors(&mut self, colors: Vec<[u8; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }

    /// Check that every face references three distinct, existing vertices.
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        for (fi, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v >= n) {
                return Err(Error::InvalidData(format!(
                    "Face {fi} references vertex {bad}, but the mesh has {n} vertices"
                )));
            }
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                return Err(Error::InvalidData(format!(
                    "Face {fi} repeats a vertex: {face:?}"
                )));
            }
        }
        Ok(())
    }

    /// Build identity-carrying vertices; the vertex index becomes its identity.
    /// Vertices without color information are white.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let color = self
                    .colors
                    .as_ref()
                    .and_then(|c| c.get(i))
                    .map_or(Color::WHITE, |&rgb| Color::from_rgb8(rgb));
                Vertex::new(VertexId(i), *p, color)
            })
            .collect()
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_counts() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert!(!mesh.is_empty());
        assert!(TriangleMesh::new().is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(quad().validate().is_ok());

        let mut out_of_range = quad();
        out_of_range.faces.push([0, 1, 7]);
        assert!(matches!(out_of_range.validate(), Err(Error::InvalidData(_))));

        let mut repeated = quad();
        repeated.faces.push([1, 1, 2]);
        assert!(repeated.validate().is_err());
    }

    #[test]
    fn test_to_vertices_colors() {
        let mut mesh = quad();
        assert!(mesh.to_vertices().iter().all(|v| *v.color() == Color::WHITE));

        mesh.set_colors(vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [0, 0, 0]]);
        let vertices = mesh.to_vertices();
        assert_eq!(vertices[1].id(), VertexId(1));
        assert_eq!(*vertices[1].color(), Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_set_colors_length_mismatch() {
        let mut mesh = quad();
        mesh.set_colors(vec![[0, 0, 0]]);
        assert!(mesh.colors.is_none());
    }
}
