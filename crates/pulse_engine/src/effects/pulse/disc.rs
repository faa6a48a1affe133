//! Static backdrop disc

use super::primitive::PulsePrimitive;
use crate::foundation::collections::{PrimitiveHandle, SceneId};
use crate::host::{HostError, RenderHost};
use crate::render::{CircleShape, Color, MaterialDescriptor};

/// Opacity of the backdrop disc. Never animated.
pub const DISC_OPACITY: f32 = 0.3;

/// The low-opacity disc the rings pulse within
#[derive(Debug)]
pub struct StaticDisc {
    primitive: PulsePrimitive,
}

impl StaticDisc {
    /// Allocate the disc
    pub fn build(host: &mut dyn RenderHost, radius: f32, segments: u32, color: Color) -> Result<Self, HostError> {
        let primitive = PulsePrimitive::build(
            host,
            CircleShape::new(radius, segments),
            MaterialDescriptor::translucent(color, DISC_OPACITY),
        )?;
        Ok(Self { primitive })
    }

    /// Host primitive handle
    pub fn handle(&self) -> PrimitiveHandle {
        self.primitive.handle()
    }

    /// Current disc shape
    pub fn shape(&self) -> CircleShape {
        self.primitive.shape()
    }

    /// Underlying primitive
    pub fn primitive(&self) -> &PulsePrimitive {
        &self.primitive
    }

    /// Rebuild at a new radius and/or segment count
    pub fn reshape(&mut self, host: &mut dyn RenderHost, radius: f32, segments: u32) -> Result<(), HostError> {
        self.primitive.reshape(host, CircleShape::new(radius, segments))
    }

    /// Retint the disc
    pub fn set_color(&mut self, host: &mut dyn RenderHost, color: Color) -> Result<(), HostError> {
        self.primitive.set_color(host, color)
    }

    /// Release everything the disc owns
    pub fn release(self, host: &mut dyn RenderHost, scene: SceneId) -> Result<(), HostError> {
        self.primitive.release(host, scene)
    }
}
