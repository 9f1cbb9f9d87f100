//! Priority policies for ranking collapse candidates
//!
//! A policy turns an edge's cached state into one scalar. Lower scores are
//! collapsed first. Illegal edges are not dropped from the queue; they get a
//! sentinel score large enough to sort behind every legitimate candidate so
//! they can become legal again after nearby collapses.

use crate::context::CollapseContext;
use crate::edge::Edge;
use progmesh_core::{Color, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score given to an illegal edge under [`PriorityPolicy::Shortest`].
pub const SHORTEST_ILLEGAL_PRIORITY: f64 = 10_000.0;

/// Score given to an illegal edge under [`PriorityPolicy::Color`].
pub const COLOR_ILLEGAL_PRIORITY: f64 = 100_000.0;

/// Scoring function used to order collapse candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityPolicy {
    /// Geometric error proxy: the edge length.
    #[default]
    Shortest,
    /// Perceptual error proxy: how far the endpoint colors sit from their average.
    Color,
}

impl PriorityPolicy {
    /// Configuration name of the policy.
    pub fn name(self) -> &'static str {
        match self {
            PriorityPolicy::Shortest => "shortest",
            PriorityPolicy::Color => "color",
        }
    }

    /// Sentinel score for edges that may not currently be collapsed.
    pub fn illegal_priority(self) -> f64 {
        match self {
            PriorityPolicy::Shortest => SHORTEST_ILLEGAL_PRIORITY,
            PriorityPolicy::Color => COLOR_ILLEGAL_PRIORITY,
        }
    }

    /// Score `edge` from its cached state. Lower means collapse sooner.
    pub fn score<C: CollapseContext + ?Sized>(self, edge: &Edge, ctx: &C) -> Result<f64> {
        if !edge.is_legal() {
            return Ok(self.illegal_priority());
        }
        match self {
            PriorityPolicy::Shortest => Ok(edge.length()),
            PriorityPolicy::Color => {
                let c1 = ctx.endpoint(edge.v1())?.color();
                let c2 = ctx.endpoint(edge.v2())?.color();
                Ok(color_deviation(c1, c2))
            }
        }
    }
}

/// Smaller of the two endpoints' L1 deviations from their average color.
pub fn color_deviation(c1: &Color, c2: &Color) -> f64 {
    let avg = Color::average(c1, c2);
    c1.abs_diff_sum(&avg).min(c2.abs_diff_sum(&avg))
}

impl FromStr for PriorityPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shortest" => Ok(PriorityPolicy::Shortest),
            "color" => Ok(PriorityPolicy::Color),
            other => Err(Error::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for PriorityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_policy() {
        assert_eq!("shortest".parse::<PriorityPolicy>(), Ok(PriorityPolicy::Shortest));
        assert_eq!("color".parse::<PriorityPolicy>(), Ok(PriorityPolicy::Color));
    }

    #[test]
    fn test_unknown_policy_is_error() {
        let err = "random".parse::<PriorityPolicy>().unwrap_err();
        assert_eq!(err, Error::UnknownPolicy("random".to_string()));
        assert!("Shortest".parse::<PriorityPolicy>().is_err());
        assert!("".parse::<PriorityPolicy>().is_err());
    }

    #[test]
    fn test_name_roundtrip() {
        for policy in [PriorityPolicy::Shortest, PriorityPolicy::Color] {
            assert_eq!(policy.to_string().parse::<PriorityPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn test_illegal_sentinels_are_ordered() {
        assert_eq!(PriorityPolicy::Shortest.illegal_priority(), 10000.0);
        assert_eq!(PriorityPolicy::Color.illegal_priority(), 100000.0);
        assert!(COLOR_ILLEGAL_PRIORITY > SHORTEST_ILLEGAL_PRIORITY);
    }

    #[test]
    fn test_color_deviation() {
        let red = Color::new(1.0, 0.0, 0.0);
        let green = Color::new(0.0, 1.0, 0.0);
        assert_relative_eq!(color_deviation(&red, &green), 1.0);
        assert_eq!(color_deviation(&red, &red), 0.0);

        // Each endpoint is equally far from the midpoint color under L1.
        let a = Color::new(0.2, 0.4, 0.6);
        let b = Color::new(0.6, 0.4, 0.2);
        assert_relative_eq!(color_deviation(&a, &b), 0.4, epsilon = 1e-12);
    }
}
