//! Render-facing descriptors
//!
//! Backend-agnostic shape and material descriptions that a host turns into
//! its own GPU-resident resources.

pub mod geometry;
pub mod material;

pub use geometry::{CircleGeometry, CircleShape, Vertex};
pub use material::{Color, MaterialDescriptor, MaterialFlags};
