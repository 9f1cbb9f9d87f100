//! Edge records: canonical identity, cached length/legality, diagnostics
//!
//! An [`Edge`] is identified purely by its two endpoint identities, stored in
//! ascending order ([`EdgeKey`]). Its length and legality are caches computed
//! at construction and refreshed only by [`Edge::recalculate`]; after a
//! nearby collapse the owner marks the edge stale and refreshes it.
//!
//! Two orderings exist for edges and they are deliberately different types:
//! `Ord` on [`Edge`]/[`EdgeKey`] is the topological order used by ordered
//! containers, while [`crate::CollapsePriority`] orders collapse candidates.

use crate::context::CollapseContext;
use progmesh_core::{distance_between, Error, Result, Vertex, VertexId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::warn;

/// Maximum difference between cached and live length before
/// [`Edge::check_consistency`] reports a divergence.
pub const LENGTH_TOLERANCE: f64 = 1e-4;

/// Canonical endpoint pair of an undirected edge, smaller identity first.
///
/// The derived ordering is lexicographic on `(v1, v2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    v1: VertexId,
    v2: VertexId,
}

impl EdgeKey {
    /// Canonicalize `(a, b)`. Identical endpoints are rejected.
    pub fn new(a: VertexId, b: VertexId) -> Result<Self> {
        match a.cmp(&b) {
            Ordering::Less => Ok(Self { v1: a, v2: b }),
            Ordering::Greater => Ok(Self { v1: b, v2: a }),
            Ordering::Equal => Err(Error::DegenerateEdge(a)),
        }
    }

    pub fn v1(&self) -> VertexId {
        self.v1
    }

    pub fn v2(&self) -> VertexId {
        self.v2
    }

    pub fn is_canonical(&self) -> bool {
        self.v1 < self.v2
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// The endpoint opposite `v`, if `v` is an endpoint.
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if v == self.v1 {
            Some(self.v2)
        } else if v == self.v2 {
            Some(self.v1)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.v1, self.v2)
    }
}

/// One way in which an edge's cache disagrees with the mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheDivergence {
    Legality { cached: bool, should_be: bool },
    Length { cached: f64, should_be: f64 },
}

/// Outcome of [`Edge::check_consistency`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    pub edge: EdgeKey,
    pub divergences: Vec<CacheDivergence>,
}

impl ConsistencyReport {
    /// True if any cached field disagreed with a fresh computation.
    pub fn found_error(&self) -> bool {
        !self.divergences.is_empty()
    }
}

/// A collapse candidate with cached length and legality.
#[derive(Debug, Clone)]
pub struct Edge {
    key: EdgeKey,
    length: f64,
    legal: bool,
    stale: bool,
}

impl Edge {
    /// Build the edge between `a` and `b`, measuring it immediately. Only the
    /// identities of `a` and `b` are used; positions are read from `ctx`.
    pub fn new<C: CollapseContext + ?Sized>(a: &Vertex, b: &Vertex, ctx: &C) -> Result<Self> {
        Self::from_key(EdgeKey::new(a.id(), b.id())?, ctx)
    }

    /// Build the edge for an existing key, resolving endpoints through `ctx`.
    pub fn from_key<C: CollapseContext + ?Sized>(key: EdgeKey, ctx: &C) -> Result<Self> {
        let (length, legal) = measure(key, ctx)?;
        Ok(Self {
            key,
            length,
            legal,
            stale: false,
        })
    }

    pub fn key(&self) -> EdgeKey {
        self.key
    }

    pub fn v1(&self) -> VertexId {
        self.key.v1
    }

    pub fn v2(&self) -> VertexId {
        self.key.v2
    }

    /// Cached length at last recomputation.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Cached legality at last recomputation.
    pub fn is_legal(&self) -> bool {
        self.legal
    }

    /// Whether the owner has flagged the cache as out of date.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Flag the cache as out of date. Nothing is recomputed until
    /// [`Edge::recalculate`] is called.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Score under the context's active policy; lower collapses sooner.
    pub fn priority_value<C: CollapseContext + ?Sized>(&self, ctx: &C) -> Result<f64> {
        ctx.policy().score(self, ctx)
    }

    /// Recompute length and legality from the current mesh state.
    pub fn recalculate<C: CollapseContext + ?Sized>(&mut self, ctx: &C) -> Result<()> {
        let (length, legal) = measure(self.key, ctx)?;
        self.length = length;
        self.legal = legal;
        self.stale = false;
        Ok(())
    }

    /// Compare the cache against a fresh computation without touching it.
    /// Every mismatch is logged at warn level.
    pub fn check_consistency<C: CollapseContext + ?Sized>(
        &self,
        ctx: &C,
    ) -> Result<ConsistencyReport> {
        let (length, legal) = measure(self.key, ctx)?;
        let mut divergences = Vec::new();

        if self.legal != legal {
            warn!(
                edge = %self.display(ctx),
                cached = self.legal,
                should_be = legal,
                "legality cache diverged"
            );
            divergences.push(CacheDivergence::Legality {
                cached: self.legal,
                should_be: legal,
            });
        }
        if (self.length - length).abs() > LENGTH_TOLERANCE {
            warn!(
                edge = %self.display(ctx),
                cached = self.length,
                should_be = length,
                "length cache diverged"
            );
            divergences.push(CacheDivergence::Length {
                cached: self.length,
                should_be: length,
            });
        }

        Ok(ConsistencyReport {
            edge: self.key,
            divergences,
        })
    }

    /// Human-readable rendering: endpoint identities, plus the live length
    /// when the edge is legal.
    pub fn display<'a, C: CollapseContext + ?Sized>(&'a self, ctx: &'a C) -> EdgeDisplay<'a, C> {
        EdgeDisplay { edge: self, ctx }
    }
}

fn measure<C: CollapseContext + ?Sized>(key: EdgeKey, ctx: &C) -> Result<(f64, bool)> {
    let a = ctx.endpoint(key.v1)?;
    let b = ctx.endpoint(key.v2)?;
    Ok((
        distance_between(a.position(), b.position()),
        ctx.is_legal_collapse(key),
    ))
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        debug_assert!(self.key.is_canonical() && other.key.is_canonical());
        self.key == other.key
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert!(self.key.is_canonical() && other.key.is_canonical());
        self.key.cmp(&other.key)
    }
}

/// Helper returned by [`Edge::display`].
pub struct EdgeDisplay<'a, C: ?Sized> {
    edge: &'a Edge,
    ctx: &'a C,
}

impl<C: CollapseContext + ?Sized> fmt::Display for EdgeDisplay<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.edge.key;
        write!(f, "EDGE {} {}", key.v1, key.v2)?;
        if self.edge.legal {
            if let (Some(a), Some(b)) = (self.ctx.vertex(key.v1), self.ctx.vertex(key.v2)) {
                write!(f, "  len={}", distance_between(a.position(), b.position()))?;
            }
        }
        Ok(())
    }
}
