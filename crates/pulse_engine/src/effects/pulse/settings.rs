//! Construction parameters for a pulse emitter

use super::error::{PulseError, PulseResult};
use super::placement::Placement;
use super::ring::RING_EPSILON_RADIUS;
use crate::config::Config;
use crate::foundation::math::{utils::is_positive_finite, Vec3};
use crate::render::{CircleShape, Color};
use serde::{Deserialize, Serialize};

/// Pulse emitter settings
///
/// Missing fields fall back to [`PulseSettings::default`] when loaded from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    /// World position of the disc centre
    pub position: Vec3,
    /// Euler rotation in radians (XYZ order)
    pub rotation: Vec3,
    /// Disc radius, also the radius the rings grow to
    pub radius: f32,
    /// Tessellation density shared by all three primitives
    pub segments: u32,
    /// Ring radius increment per active frame
    pub growth_rate: f32,
    /// Tint shared by all three primitives
    pub color: Color,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            radius: 10.0,
            segments: 32,
            growth_rate: 0.1,
            color: Color::from_hex(0x00ccff),
        }
    }
}

impl PulseSettings {
    /// Set the placement
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.position = placement.position;
        self.rotation = placement.rotation;
        self
    }

    /// Set the disc radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the segment count
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments;
        self
    }

    /// Set the tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the ring growth rate
    pub fn with_growth_rate(mut self, growth_rate: f32) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    /// Placement described by these settings
    pub fn placement(&self) -> Placement {
        Placement::new(self.position, self.rotation)
    }

    /// Check every invariant the emitter relies on
    pub fn validate(&self) -> PulseResult<()> {
        validate_radius(self.radius)?;
        validate_segments(self.segments)?;
        validate_growth_rate(self.growth_rate)?;
        validate_progress(self.radius, self.growth_rate)?;
        validate_placement(&self.placement())
    }
}

impl Config for PulseSettings {}

pub(crate) fn validate_radius(radius: f32) -> PulseResult<()> {
    if is_positive_finite(radius) && radius > RING_EPSILON_RADIUS {
        Ok(())
    } else {
        Err(PulseError::invalid(
            "radius",
            format!("must be finite and greater than {RING_EPSILON_RADIUS}, got {radius}"),
        ))
    }
}

/// A step must still move a ring sitting just under `radius`; below one ulp
/// of the target the addition rounds away and the ring never reaches it.
pub(crate) fn validate_progress(radius: f32, growth_rate: f32) -> PulseResult<()> {
    let min_step = radius * f32::EPSILON;
    if growth_rate >= min_step {
        Ok(())
    } else {
        Err(PulseError::invalid(
            "growth_rate",
            format!("{growth_rate} is too small to grow a ring to radius {radius} (minimum {min_step})"),
        ))
    }
}

pub(crate) fn validate_segments(segments: u32) -> PulseResult<()> {
    if (CircleShape::MIN_SEGMENTS..=CircleShape::MAX_SEGMENTS).contains(&segments) {
        Ok(())
    } else {
        Err(PulseError::invalid(
            "segments",
            format!(
                "must be between {} and {}, got {segments}",
                CircleShape::MIN_SEGMENTS,
                CircleShape::MAX_SEGMENTS
            ),
        ))
    }
}

pub(crate) fn validate_growth_rate(growth_rate: f32) -> PulseResult<()> {
    if is_positive_finite(growth_rate) {
        Ok(())
    } else {
        Err(PulseError::invalid("growth_rate", format!("must be positive and finite, got {growth_rate}")))
    }
}

pub(crate) fn validate_placement(placement: &Placement) -> PulseResult<()> {
    if placement.is_finite() {
        Ok(())
    } else {
        Err(PulseError::invalid("placement", "position and rotation must be finite"))
    }
}
