//! Progressive edge-collapse simplification driver
//!
//! Repeatedly collapses the best-ranked legal edge of a [`WorkingMesh`],
//! keeping the [`CollapseQueue`] in sync after every collapse.

use crate::edge::Edge;
use crate::policy::PriorityPolicy;
use crate::queue::CollapseQueue;
use crate::working_mesh::WorkingMesh;
use crate::MeshSimplifier;
use progmesh_core::{Error, Result, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Parameters for progressive simplification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyParams {
    /// How collapse candidates are ranked. Default: shortest edge first
    pub policy: PriorityPolicy,

    /// Stop once the mesh has at most this many faces.
    pub target_faces: Option<usize>,

    /// Stop once the mesh has at most this many vertices.
    pub target_vertices: Option<usize>,

    /// Never collapse an edge touching the mesh boundary. Default: false
    pub preserve_boundary: bool,

    /// Run the cache consistency check on every queued edge after each
    /// collapse. Slow; meant for debugging. Default: false
    pub verify_caches: bool,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            policy: PriorityPolicy::Shortest,
            target_faces: None,
            target_vertices: None,
            preserve_boundary: false,
            verify_caches: false,
        }
    }
}

impl SimplifyParams {
    /// Params for a policy given by its configuration name.
    pub fn with_policy_name(name: &str) -> Result<Self> {
        Ok(Self {
            policy: name.parse()?,
            ..Default::default()
        })
    }

    pub fn with_target_faces(count: usize) -> Self {
        Self {
            target_faces: Some(count),
            ..Default::default()
        }
    }

    pub fn with_target_vertices(count: usize) -> Self {
        Self {
            target_vertices: Some(count),
            ..Default::default()
        }
    }

    fn reached(&self, mesh: &WorkingMesh) -> bool {
        self.target_faces.is_some_and(|t| mesh.face_count() <= t)
            || self.target_vertices.is_some_and(|t| mesh.vertex_count() <= t)
    }
}

/// Simplified mesh plus statistics.
#[derive(Debug, Clone)]
pub struct SimplificationResult {
    pub mesh: TriangleMesh,
    pub original_faces: usize,
    pub final_faces: usize,
    pub original_vertices: usize,
    pub final_vertices: usize,
    pub collapses_performed: usize,
    /// Cache divergences found when `verify_caches` is on.
    pub cache_divergences: usize,
}

impl fmt::Display for SimplificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Simplified {} -> {} faces, {} -> {} vertices ({} collapses)",
            self.original_faces,
            self.final_faces,
            self.original_vertices,
            self.final_vertices,
            self.collapses_performed
        )
    }
}

/// Edge collapse simplifier ordered by a [`PriorityPolicy`].
#[derive(Debug, Clone, Default)]
pub struct ProgressiveSimplifier {
    pub params: SimplifyParams,
}

impl ProgressiveSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: SimplifyParams) -> Self {
        Self { params }
    }

    /// Collapse edges until a target is reached or no legal collapse remains.
    pub fn run(&self, mesh: &TriangleMesh) -> Result<SimplificationResult> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        let params = &self.params;
        let mut work = WorkingMesh::from_triangle_mesh(mesh, params.policy, params.preserve_boundary)?;
        let mut queue = CollapseQueue::build(&work.edge_keys(), &work)?;

        let original_faces = work.face_count();
        let original_vertices = work.vertex_count();
        info!(
            faces = original_faces,
            vertices = original_vertices,
            policy = %params.policy,
            "Starting progressive simplification"
        );

        let mut collapses_performed = 0;
        let mut cache_divergences = 0;

        while !params.reached(&work) {
            let Some((edge, score)) = queue.peek() else {
                break;
            };
            // Legal edges always rank ahead of illegal ones.
            if !edge.is_legal() {
                debug!(edge = %edge.display(&work), "No legal collapse remains");
                break;
            }
            let key = edge.key();

            let outcome = work.collapse(key)?;
            debug!(edge = %key, score, faces = work.face_count(), "Collapsed edge");

            queue.retire_vertex(outcome.removed);
            for dropped in &outcome.dropped_edges {
                queue.remove(*dropped);
            }
            for &added in &outcome.new_edges {
                queue.insert(Edge::from_key(added, &work)?, &work)?;
            }
            queue.invalidate_vertex(outcome.survivor);
            for neighbor in work.neighbors(outcome.survivor) {
                queue.invalidate_vertex(neighbor);
            }
            queue.refresh_stale(&work)?;
            collapses_performed += 1;

            if params.verify_caches {
                let failures = queue.verify(&work)?;
                if !failures.is_empty() {
                    warn!(
                        count = failures.len(),
                        after = %key,
                        "Edge caches diverged from mesh state"
                    );
                }
                cache_divergences += failures.len();
            }
        }

        let result = SimplificationResult {
            mesh: work.to_triangle_mesh(),
            original_faces,
            final_faces: work.face_count(),
            original_vertices,
            final_vertices: work.vertex_count(),
            collapses_performed,
            cache_divergences,
        };
        info!(
            final_faces = result.final_faces,
            collapses = collapses_performed,
            "Simplification complete"
        );
        Ok(result)
    }
}

impl MeshSimplifier for ProgressiveSimplifier {
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&reduction_ratio) {
            return Err(Error::InvalidData(
                "Reduction ratio must be between 0.0 and 1.0".to_string(),
            ));
        }
        if reduction_ratio == 0.0 {
            return Ok(mesh.clone());
        }

        let target_faces = ((1.0 - reduction_ratio) * mesh.faces.len() as f32) as usize;
        let simplifier = ProgressiveSimplifier::with_params(SimplifyParams {
            target_faces: Some(target_faces),
            ..self.params.clone()
        });
        Ok(simplifier.run(mesh)?.mesh)
    }
}
