//! Placement shared by the three pulse primitives

use crate::foundation::math::{quat_from_euler_xyz, Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Position plus Euler orientation (radians, XYZ order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// World position of the disc centre
    pub position: Vec3,
    /// Euler rotation in radians
    pub rotation: Vec3,
}

impl Placement {
    /// Create a placement
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Unrotated placement at `position`
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::zeros())
    }

    /// Whether every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.rotation.iter()).all(|v| v.is_finite())
    }

    /// Convert to a unit-scale transform
    pub fn to_transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, quat_from_euler_xyz(self.rotation))
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Vec3::zeros())
    }
}
