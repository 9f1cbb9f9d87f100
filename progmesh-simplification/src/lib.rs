//! Edge-collapse ordering for progressive mesh simplification
//!
//! This crate decides which edge of a triangle mesh should be collapsed next
//! and whether collapsing it is allowed:
//! - Edge records with canonical identity and cached length/legality
//! - Pluggable priority policies ("shortest" and "color")
//! - A collapse queue with explicit stale-edge invalidation
//! - A reference working mesh and a progressive simplifier driving them

pub mod context;
pub mod policy;
pub mod edge;
pub mod queue;
pub mod working_mesh;
pub mod simplifier;

pub use context::*;
pub use policy::*;
pub use edge::*;
pub use queue::*;
pub use working_mesh::*;
pub use simplifier::*;

use progmesh_core::{Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify mesh with target reduction ratio (0.0 = no reduction, 1.0 = maximum reduction)
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{CollapseContext, EdgeKey, PriorityPolicy};
    use nalgebra::Point3;
    use progmesh_core::{Color, Point3f, TriangleMesh, Vertex, VertexId};
    use std::collections::HashSet;

    /// Free-standing vertices with a hand-controlled legality predicate.
    pub struct FixtureMesh {
        pub policy: PriorityPolicy,
        vertices: Vec<Vertex>,
        forbidden: HashSet<EdgeKey>,
    }

    impl FixtureMesh {
        pub fn new(policy: PriorityPolicy, vertices: Vec<(Point3f, Color)>) -> Self {
            Self {
                policy,
                vertices: vertices
                    .into_iter()
                    .enumerate()
                    .map(|(i, (p, c))| Vertex::new(VertexId(i), p, c))
                    .collect(),
                forbidden: HashSet::new(),
            }
        }

        pub fn v(&self, i: usize) -> &Vertex {
            &self.vertices[i]
        }

        pub fn forbid(&mut self, key: EdgeKey) {
            self.forbidden.insert(key);
        }

        pub fn allow(&mut self, key: EdgeKey) {
            self.forbidden.remove(&key);
        }

        pub fn move_vertex(&mut self, i: usize, to: Point3f) {
            self.vertices[i].position = to;
        }
    }

    impl CollapseContext for FixtureMesh {
        fn policy(&self) -> PriorityPolicy {
            self.policy
        }

        fn vertex(&self, id: VertexId) -> Option<&Vertex> {
            self.vertices.get(id.index())
        }

        fn is_legal_collapse(&self, edge: EdgeKey) -> bool {
            !self.forbidden.contains(&edge)
        }
    }

    pub fn make_single_triangle() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    pub fn make_tetrahedron() -> TriangleMesh {
        // Consistently wound: each shared edge appears in opposite directions
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(0.5, 0.5, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    pub fn make_plane_grid(size: usize) -> TriangleMesh {
        let mut vertices = Vec::new();
        for y in 0..size {
            for x in 0..size {
                vertices.push(Point3::new(x as f32, y as f32, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..(size - 1) {
            for x in 0..(size - 1) {
                let tl = y * size + x;
                let tr = tl + 1;
                let bl = (y + 1) * size + x;
                let br = bl + 1;
                faces.push([tl, bl, tr]);
                faces.push([tr, bl, br]);
            }
        }
        TriangleMesh::from_vertices_and_faces(vertices, faces)
    }
}
