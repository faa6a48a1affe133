//! Circle geometry generation
//!
//! A circle is tessellated as a triangle fan: one centre vertex followed by
//! `segments + 1` rim vertices (the last rim vertex closes the loop), lying in
//! the local XY plane and facing +Z.

use crate::foundation::math::constants::TAU;
use std::collections::TryReserveError;

/// Descriptor for a flat circle shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    /// Circle radius in world units
    pub radius: f32,

    /// Number of rim segments (tessellation density)
    pub segments: u32,
}

impl CircleShape {
    /// Smallest segment count that still encloses an area
    pub const MIN_SEGMENTS: u32 = 3;

    /// Largest segment count whose rim vertices are still addressable by `u32` indices
    pub const MAX_SEGMENTS: u32 = u32::MAX - 1;

    /// Create a new circle shape descriptor
    pub fn new(radius: f32, segments: u32) -> Self {
        Self { radius, segments }
    }

    /// Whether the descriptor can produce non-degenerate geometry
    pub fn is_valid(&self) -> bool {
        self.radius.is_finite()
            && self.radius > 0.0
            && (Self::MIN_SEGMENTS..=Self::MAX_SEGMENTS).contains(&self.segments)
    }

    /// Vertex plus index bytes a [`CircleGeometry`] built from this shape occupies.
    ///
    /// Computed from the descriptor alone, without tessellating. `None` if the
    /// size does not fit in `usize`.
    pub fn byte_size(&self) -> Option<usize> {
        let segments = usize::try_from(self.segments.max(Self::MIN_SEGMENTS)).ok()?;
        let vertex_bytes = segments.checked_add(2)?.checked_mul(std::mem::size_of::<Vertex>())?;
        let index_bytes = segments.checked_mul(3)?.checked_mul(std::mem::size_of::<u32>())?;
        vertex_bytes.checked_add(index_bytes)
    }
}

/// Vertex with position, normal, and texture coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in local space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

/// Immutable circle buffers built from a [`CircleShape`]
///
/// There is no way to resize an existing geometry; a new radius means a new
/// `CircleGeometry`.
#[derive(Debug, Clone)]
pub struct CircleGeometry {
    shape: CircleShape,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl CircleGeometry {
    /// Build the triangle fan for `shape`
    pub fn build(shape: CircleShape) -> Self {
        let segments = shape.segments.max(CircleShape::MIN_SEGMENTS);
        let vertices = Vec::with_capacity(segments as usize + 2);
        let indices = Vec::with_capacity(segments as usize * 3);
        Self::fill(shape, segments, vertices, indices)
    }

    /// Build the triangle fan for `shape`, reporting a failed buffer
    /// reservation instead of aborting
    pub fn try_build(shape: CircleShape) -> Result<Self, TryReserveError> {
        let segments = shape.segments.max(CircleShape::MIN_SEGMENTS);
        let mut vertices = Vec::new();
        vertices.try_reserve_exact((segments as usize).saturating_add(2))?;
        let mut indices = Vec::new();
        indices.try_reserve_exact((segments as usize).saturating_mul(3))?;
        Ok(Self::fill(shape, segments, vertices, indices))
    }

    fn fill(shape: CircleShape, segments: u32, mut vertices: Vec<Vertex>, mut indices: Vec<u32>) -> Self {
        let normal = [0.0, 0.0, 1.0];
        vertices.push(Vertex {
            position: [0.0, 0.0, 0.0],
            normal,
            tex_coord: [0.5, 0.5],
        });

        for s in 0..=segments {
            let theta = TAU * s as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            vertices.push(Vertex {
                position: [shape.radius * cos, shape.radius * sin, 0.0],
                normal,
                tex_coord: [(cos + 1.0) * 0.5, (sin + 1.0) * 0.5],
            });
        }

        for i in 1..=segments {
            indices.extend_from_slice(&[i, i + 1, 0]);
        }

        Self { shape, vertices, indices }
    }

    /// Shape this geometry was built from
    pub fn shape(&self) -> CircleShape {
        self.shape
    }

    /// Radius of the bounding sphere (the circle radius)
    pub fn bounding_radius(&self) -> f32 {
        self.shape.radius
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex bytes as they would be uploaded
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Total resident size of vertex and index buffers in bytes
    pub fn byte_size(&self) -> usize {
        self.vertex_bytes().len() + std::mem::size_of_val(self.indices.as_slice())
    }
}
