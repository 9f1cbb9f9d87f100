//! Mutable mesh used while simplifying
//!
//! Stores faces as vertex-identity triples with a per-vertex face index, which
//! is enough for the local queries the legality predicate needs (neighbour
//! rings, faces around an edge, boundary detection) and for the collapse
//! itself. Implements [`CollapseContext`] so edges can be evaluated against it.

use crate::context::CollapseContext;
use crate::edge::EdgeKey;
use crate::policy::PriorityPolicy;
use itertools::Itertools;
use progmesh_core::{
    midpoint, triangle_normal, Color, Error, Point3f, Result, TriangleMesh, Vertex, VertexId,
};
use std::collections::{BTreeSet, HashMap};

/// Squared normal length below which a triangle is treated as degenerate.
const DEGENERATE_NORMAL_SQ: f64 = 1e-12;

/// What a single collapse changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseOutcome {
    /// Endpoint that remains, now at the edge midpoint.
    pub survivor: VertexId,
    /// Endpoint merged into the survivor; it no longer exists.
    pub removed: VertexId,
    pub faces_removed: usize,
    /// Edges not touching `removed` that no longer bound any face.
    pub dropped_edges: Vec<EdgeKey>,
    /// Edges of the survivor that did not exist before the collapse.
    pub new_edges: Vec<EdgeKey>,
}

/// Triangle mesh supporting edge collapse.
#[derive(Debug, Clone)]
pub struct WorkingMesh {
    vertices: Vec<Option<Vertex>>,
    faces: Vec<Option<[VertexId; 3]>>,
    vertex_faces: Vec<BTreeSet<usize>>,
    policy: PriorityPolicy,
    preserve_boundary: bool,
    has_colors: bool,
    active_faces: usize,
    active_vertices: usize,
}

impl WorkingMesh {
    pub fn from_triangle_mesh(
        mesh: &TriangleMesh,
        policy: PriorityPolicy,
        preserve_boundary: bool,
    ) -> Result<Self> {
        mesh.validate()?;

        let mut vertex_faces = vec![BTreeSet::new(); mesh.vertex_count()];
        let faces = mesh
            .faces
            .iter()
            .enumerate()
            .map(|(fi, face)| {
                for &v in face {
                    vertex_faces[v].insert(fi);
                }
                Some(face.map(VertexId))
            })
            .collect();
        let active_vertices = vertex_faces.iter().filter(|f| !f.is_empty()).count();

        Ok(Self {
            vertices: mesh.to_vertices().into_iter().map(Some).collect(),
            faces,
            vertex_faces,
            policy,
            preserve_boundary,
            has_colors: mesh.colors.is_some(),
            active_faces: mesh.face_count(),
            active_vertices,
        })
    }

    pub fn preserve_boundary(&self) -> bool {
        self.preserve_boundary
    }

    /// Number of faces still present.
    pub fn face_count(&self) -> usize {
        self.active_faces
    }

    /// Number of vertices still referenced by a face.
    pub fn vertex_count(&self) -> usize {
        self.active_vertices
    }

    /// Every edge bounding a live face, in topological order.
    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        let mut keys = BTreeSet::new();
        for face in self.faces.iter().flatten() {
            for (&a, &b) in face.iter().circular_tuple_windows() {
                if let Ok(key) = EdgeKey::new(a, b) {
                    keys.insert(key);
                }
            }
        }
        keys.into_iter().collect()
    }

    fn faces_of(&self, v: VertexId) -> &BTreeSet<usize> {
        &self.vertex_faces[v.index()]
    }

    fn face_positions(&self, face: &[VertexId; 3]) -> Option<[Point3f; 3]> {
        let p = |v: VertexId| self.vertex(v).map(|vx| vx.position);
        Some([p(face[0])?, p(face[1])?, p(face[2])?])
    }

    /// Vertices sharing a face with `v`.
    pub fn neighbors(&self, v: VertexId) -> BTreeSet<VertexId> {
        if self.vertex(v).is_none() {
            return BTreeSet::new();
        }
        self.faces_of(v)
            .iter()
            .filter_map(|&fi| self.faces[fi].as_ref())
            .flatten()
            .copied()
            .filter(|&u| u != v)
            .collect()
    }

    /// Indices of the faces bounded by the edge `a`-`b`.
    fn edge_faces(&self, a: VertexId, b: VertexId) -> BTreeSet<usize> {
        self.faces_of(a)
            .intersection(self.faces_of(b))
            .copied()
            .collect()
    }

    pub fn has_edge(&self, key: EdgeKey) -> bool {
        self.vertex(key.v1()).is_some()
            && self.vertex(key.v2()).is_some()
            && !self.edge_faces(key.v1(), key.v2()).is_empty()
    }

    pub fn is_boundary_edge(&self, key: EdgeKey) -> bool {
        self.vertex(key.v1()).is_some()
            && self.vertex(key.v2()).is_some()
            && self.edge_faces(key.v1(), key.v2()).len() == 1
    }

    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.neighbors(v)
            .into_iter()
            .any(|u| self.edge_faces(v, u).len() == 1)
    }

    /// Would moving both endpoints to `target` turn any surviving face around?
    fn collapse_flips_face(&self, a: VertexId, b: VertexId, target: &Point3f) -> bool {
        let shared = self.edge_faces(a, b);
        for &fi in self.faces_of(a).union(self.faces_of(b)) {
            if shared.contains(&fi) {
                continue;
            }
            let Some(face) = self.faces[fi] else {
                continue;
            };
            let Some(before) = self.face_positions(&face) else {
                continue;
            };
            let mut after = before;
            for (slot, v) in face.iter().enumerate() {
                if *v == a || *v == b {
                    after[slot] = *target;
                }
            }
            let n_before = triangle_normal(&before[0], &before[1], &before[2]);
            if n_before.norm_squared() <= DEGENERATE_NORMAL_SQ {
                continue;
            }
            let n_after = triangle_normal(&after[0], &after[1], &after[2]);
            if n_after.dot(&n_before) <= 0.0 {
                return true;
            }
        }
        false
    }

    fn check_legal(&self, key: EdgeKey) -> bool {
        let (a, b) = (key.v1(), key.v2());
        let (Some(va), Some(vb)) = (self.vertex(a), self.vertex(b)) else {
            return false;
        };

        let shared = self.edge_faces(a, b).len();
        if shared == 0 || shared > 2 {
            return false;
        }

        // Link condition
        let na = self.neighbors(a);
        let nb = self.neighbors(b);
        if na.intersection(&nb).count() != shared {
            return false;
        }

        let ring: BTreeSet<VertexId> = na
            .union(&nb)
            .copied()
            .filter(|&u| u != a && u != b)
            .collect();
        if ring.len() < 3 {
            return false;
        }

        let boundary_a = self.is_boundary_vertex(a);
        let boundary_b = self.is_boundary_vertex(b);
        if shared == 2 && boundary_a && boundary_b {
            return false;
        }
        if self.preserve_boundary && (boundary_a || boundary_b) {
            return false;
        }

        let target = midpoint(va.position(), vb.position());
        !self.collapse_flips_face(a, b, &target)
    }

    /// Merge `key.v2()` into `key.v1()`, placing the survivor at the edge
    /// midpoint with the average color. Faces bounded by the edge are deleted.
    pub fn collapse(&mut self, key: EdgeKey) -> Result<CollapseOutcome> {
        let (keep, gone) = (key.v1(), key.v2());
        if self.vertex(keep).is_none() || self.vertex(gone).is_none() || !self.has_edge(key) {
            return Err(Error::MissingEdge(keep, gone));
        }
        if !self.check_legal(key) {
            return Err(Error::IllegalCollapse(keep, gone));
        }

        // Edges that may disappear or appear, recorded before mutating.
        let mut watched: BTreeSet<EdgeKey> = BTreeSet::new();
        for &fi in self.faces_of(keep).union(self.faces_of(gone)) {
            if let Some(face) = self.faces[fi] {
                for (&a, &b) in face.iter().circular_tuple_windows() {
                    if !(a == gone || b == gone) {
                        if let Ok(k) = EdgeKey::new(a, b) {
                            watched.insert(k);
                        }
                    }
                }
            }
        }
        let keep_neighbors_before = self.neighbors(keep);

        let mut faces_removed = 0;
        let mut touched: BTreeSet<VertexId> = BTreeSet::new();
        let gone_faces: Vec<usize> = self.faces_of(gone).iter().copied().collect();
        for fi in gone_faces {
            let Some(mut face) = self.faces[fi] else {
                continue;
            };
            if face.contains(&keep) {
                self.faces[fi] = None;
                for v in face {
                    self.vertex_faces[v.index()].remove(&fi);
                    touched.insert(v);
                }
                self.active_faces -= 1;
                faces_removed += 1;
            } else {
                for v in face.iter_mut() {
                    if *v == gone {
                        *v = keep;
                    }
                }
                self.faces[fi] = Some(face);
                self.vertex_faces[keep.index()].insert(fi);
            }
        }
        self.vertex_faces[gone.index()].clear();

        let (Some(Some(gv)), Some(Some(kv))) = (
            self.vertices.get(gone.index()).cloned(),
            self.vertices.get(keep.index()).cloned(),
        ) else {
            return Err(Error::MissingEdge(keep, gone));
        };
        self.vertices[gone.index()] = None;
        self.vertices[keep.index()] = Some(Vertex::new(
            keep,
            midpoint(kv.position(), gv.position()),
            Color::average(kv.color(), gv.color()),
        ));

        // The absorbed vertex, plus any vertex left without faces.
        self.active_vertices -= 1;
        for v in touched {
            if v != gone && self.faces_of(v).is_empty() {
                self.active_vertices -= 1;
            }
        }

        let dropped_edges = watched
            .into_iter()
            .filter(|&k| !self.has_edge(k))
            .collect();
        let new_edges = self
            .neighbors(keep)
            .into_iter()
            .filter(|u| !keep_neighbors_before.contains(u))
            .filter_map(|u| EdgeKey::new(keep, u).ok())
            .collect();

        Ok(CollapseOutcome {
            survivor: keep,
            removed: gone,
            faces_removed,
            dropped_edges,
            new_edges,
        })
    }

    /// Compact live vertices and faces back into an indexed mesh.
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        let mut old_to_new: HashMap<VertexId, usize> = HashMap::new();
        let mut positions = Vec::new();
        let mut colors = Vec::new();

        for (i, slot) in self.vertices.iter().enumerate() {
            if let Some(v) = slot {
                if !self.vertex_faces[i].is_empty() {
                    old_to_new.insert(v.id(), positions.len());
                    positions.push(v.position);
                    colors.push(v.color.to_rgb8());
                }
            }
        }

        let faces = self
            .faces
            .iter()
            .flatten()
            .filter_map(|face| {
                Some([
                    *old_to_new.get(&face[0])?,
                    *old_to_new.get(&face[1])?,
                    *old_to_new.get(&face[2])?,
                ])
            })
            .collect();

        let mut mesh = TriangleMesh::from_vertices_and_faces(positions, faces);
        if self.has_colors {
            mesh.set_colors(colors);
        }
        mesh
    }
}

impl CollapseContext for WorkingMesh {
    fn policy(&self) -> PriorityPolicy {
        self.policy
    }

    fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index()).and_then(Option::as_ref)
    }

    fn is_legal_collapse(&self, edge: EdgeKey) -> bool {
        self.check_legal(edge)
    }
}
