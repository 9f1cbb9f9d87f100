//! Collapse queue: topology-keyed edge store plus a priority index
//!
//! Edges live in a `BTreeMap` keyed by [`EdgeKey`] (the topological order)
//! with a per-vertex incidence index. A separate `PriorityQueue` keyed by the
//! same keys orders them by [`CollapsePriority`]. Illegal edges stay in the
//! queue with their sentinel score.
//!
//! Refresh protocol: after a collapse the driver calls
//! [`CollapseQueue::retire_vertex`] for the absorbed vertex, inserts any edges
//! the survivor gained, calls [`CollapseQueue::invalidate_vertex`] for the
//! survivor and each of its neighbours, then [`CollapseQueue::refresh_stale`].
//! Refreshing recomputes every stale edge and updates its priority in place.

use crate::context::CollapseContext;
use crate::edge::{ConsistencyReport, Edge, EdgeKey};
use priority_queue::PriorityQueue;
use progmesh_core::{Result, VertexId};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Queue position of an edge: legal edges before illegal ones, then lower
/// score, then smaller key.
#[derive(Debug, Clone, Copy)]
pub struct CollapsePriority {
    legal: bool,
    value: f64,
    key: EdgeKey,
}

impl CollapsePriority {
    pub fn new(legal: bool, value: f64, key: EdgeKey) -> Self {
        Self { legal, value, key }
    }

    /// Position of `edge` under the context policy.
    pub fn of<C: CollapseContext + ?Sized>(edge: &Edge, ctx: &C) -> Result<Self> {
        Ok(Self::new(edge.is_legal(), edge.priority_value(ctx)?, edge.key()))
    }

    pub fn is_legal(&self) -> bool {
        self.legal
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialEq for CollapsePriority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CollapsePriority {}

impl PartialOrd for CollapsePriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollapsePriority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on top: legal before illegal regardless of score, then
        // smallest score, then smallest key.
        self.legal
            .cmp(&other.legal)
            .then_with(|| other.value.total_cmp(&self.value))
            .then_with(|| other.key.cmp(&self.key))
    }
}

/// Live collapse candidates of one mesh.
#[derive(Debug, Default)]
pub struct CollapseQueue {
    edges: BTreeMap<EdgeKey, Edge>,
    incidence: HashMap<VertexId, BTreeSet<EdgeKey>>,
    heap: PriorityQueue<EdgeKey, CollapsePriority>,
    stale: BTreeSet<EdgeKey>,
}

impl CollapseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue already constructed edges, scoring each under the context policy.
    pub fn from_edges<C, I>(edges: I, ctx: &C) -> Result<Self>
    where
        C: CollapseContext + ?Sized,
        I: IntoIterator<Item = Edge>,
    {
        let mut queue = Self::new();
        for edge in edges {
            queue.insert(edge, ctx)?;
        }
        Ok(queue)
    }

    /// Construct and queue an edge for every key. Construction only reads
    /// the mesh, so it runs in parallel.
    pub fn build<C>(keys: &[EdgeKey], ctx: &C) -> Result<Self>
    where
        C: CollapseContext + Sync + ?Sized,
    {
        let edges = keys
            .par_iter()
            .map(|&key| Edge::from_key(key, ctx))
            .collect::<Result<Vec<_>>>()?;
        debug!(edges = edges.len(), "Built collapse candidates");
        Self::from_edges(edges, ctx)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, key: EdgeKey) -> bool {
        self.edges.contains_key(&key)
    }

    pub fn get(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(&key)
    }

    /// Edges in topological order.
    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Current queue score of `key`.
    pub fn priority_of(&self, key: EdgeKey) -> Option<f64> {
        self.heap.get_priority(&key).map(CollapsePriority::value)
    }

    /// Add or replace an edge. Returns the edge previously stored under
    /// the same key.
    pub fn insert<C: CollapseContext + ?Sized>(
        &mut self,
        edge: Edge,
        ctx: &C,
    ) -> Result<Option<Edge>> {
        let key = edge.key();
        let priority = CollapsePriority::of(&edge, ctx)?;
        if edge.is_stale() {
            self.stale.insert(key);
        } else {
            self.stale.remove(&key);
        }
        for v in [key.v1(), key.v2()] {
            self.incidence.entry(v).or_default().insert(key);
        }
        self.heap.push(key, priority);
        Ok(self.edges.insert(key, edge))
    }

    pub fn remove(&mut self, key: EdgeKey) -> Option<Edge> {
        let edge = self.edges.remove(&key)?;
        self.heap.remove(&key);
        self.stale.remove(&key);
        for v in [key.v1(), key.v2()] {
            if let Some(keys) = self.incidence.get_mut(&v) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.incidence.remove(&v);
                }
            }
        }
        Some(edge)
    }

    /// Best candidate and its score, without removing it.
    pub fn peek(&self) -> Option<(&Edge, f64)> {
        let (key, priority) = self.heap.peek()?;
        self.edges.get(key).map(|edge| (edge, priority.value()))
    }

    /// Remove and return the best candidate and its score.
    pub fn pop(&mut self) -> Option<(Edge, f64)> {
        let (key, priority) = self.heap.peek().map(|(k, p)| (*k, p.value()))?;
        self.remove(key).map(|edge| (edge, priority))
    }

    /// Keys of every queued edge touching `v`, in topological order.
    pub fn incident(&self, v: VertexId) -> Vec<EdgeKey> {
        self.incidence
            .get(&v)
            .map(|keys| keys.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Mark every edge touching `v` stale. Returns how many were marked.
    pub fn invalidate_vertex(&mut self, v: VertexId) -> usize {
        let Some(keys) = self.incidence.get(&v) else {
            return 0;
        };
        for key in keys {
            if let Some(edge) = self.edges.get_mut(key) {
                edge.mark_stale();
                self.stale.insert(*key);
            }
        }
        keys.len()
    }

    pub fn stale_count(&self) -> usize {
        self.stale.len()
    }

    /// Recompute every stale edge and move it to its new queue position.
    /// Returns how many edges were refreshed.
    pub fn refresh_stale<C: CollapseContext + ?Sized>(&mut self, ctx: &C) -> Result<usize> {
        let mut refreshed = 0;
        while let Some(key) = self.stale.pop_first() {
            let Some(edge) = self.edges.get_mut(&key) else {
                continue;
            };
            edge.recalculate(ctx)?;
            let priority = CollapsePriority::of(edge, ctx)?;
            self.heap.change_priority(&key, priority);
            refreshed += 1;
        }
        debug!(refreshed, "Refreshed stale collapse candidates");
        Ok(refreshed)
    }

    /// Drop every edge touching `v`, e.g. after `v` was absorbed by a collapse.
    pub fn retire_vertex(&mut self, v: VertexId) -> Vec<Edge> {
        self.incident(v)
            .into_iter()
            .filter_map(|key| self.remove(key))
            .collect()
    }

    /// Run the consistency check on every edge; returns the failing reports.
    pub fn verify<C: CollapseContext + ?Sized>(&self, ctx: &C) -> Result<Vec<ConsistencyReport>> {
        let mut failures = Vec::new();
        for edge in self.edges.values() {
            let report = edge.check_consistency(ctx)?;
            if report.found_error() {
                failures.push(report);
            }
        }
        Ok(failures)
    }
}
