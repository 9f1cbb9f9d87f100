//! Core data structures for progmesh
//!
//! This crate provides the fundamental types shared by the simplification
//! engine: vertex identities, points, colors, the indexed input mesh and the
//! common error type.

pub mod point;
pub mod color;
pub mod vertex;
pub mod mesh;
pub mod error;

pub use point::*;
pub use color::*;
pub use vertex::*;
pub use mesh::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
