//! One pulse primitive: a shape slot, a material and the host primitive binding them

use super::slot::ShapeSlot;
use crate::foundation::collections::{MaterialHandle, PrimitiveHandle, SceneId};
use crate::host::{HostError, RenderHost};
use crate::render::{CircleShape, Color, MaterialDescriptor};

/// Host primitive owned by a pulse emitter
#[derive(Debug)]
pub struct PulsePrimitive {
    primitive: PrimitiveHandle,
    material: MaterialHandle,
    descriptor: MaterialDescriptor,
    slot: ShapeSlot,
}

impl PulsePrimitive {
    /// Allocate shape, material and primitive. Nothing stays allocated on failure.
    pub fn build(
        host: &mut dyn RenderHost,
        shape: CircleShape,
        descriptor: MaterialDescriptor,
    ) -> Result<Self, HostError> {
        let mut slot = ShapeSlot::allocate(host, shape)?;

        let material = match host.create_material(&descriptor) {
            Ok(material) => material,
            Err(err) => {
                log_cleanup(slot.release(host));
                return Err(err);
            }
        };

        let bound = slot
            .handle()
            .ok_or(HostError::UnknownHandle { kind: "shape" })
            .and_then(|shape| host.create_primitive(shape, material));
        let primitive = match bound {
            Ok(primitive) => primitive,
            Err(err) => {
                log_cleanup(host.release_material(material));
                log_cleanup(slot.release(host));
                return Err(err);
            }
        };

        Ok(Self { primitive, material, descriptor, slot })
    }

    /// Host primitive handle
    pub fn handle(&self) -> PrimitiveHandle {
        self.primitive
    }

    /// Current material parameters
    pub fn material(&self) -> &MaterialDescriptor {
        &self.descriptor
    }

    /// Current shape descriptor
    pub fn shape(&self) -> CircleShape {
        self.slot.shape()
    }

    /// Rebuild the shape
    pub fn reshape(&mut self, host: &mut dyn RenderHost, shape: CircleShape) -> Result<(), HostError> {
        self.slot.rebuild(host, self.primitive, shape)
    }

    /// Push a new opacity to the host
    pub fn set_opacity(&mut self, host: &mut dyn RenderHost, opacity: f32) -> Result<(), HostError> {
        self.apply(host, self.descriptor.with_opacity(opacity))
    }

    /// Push a new tint to the host, keeping opacity
    pub fn set_color(&mut self, host: &mut dyn RenderHost, color: Color) -> Result<(), HostError> {
        self.apply(host, self.descriptor.with_color(color))
    }

    fn apply(&mut self, host: &mut dyn RenderHost, descriptor: MaterialDescriptor) -> Result<(), HostError> {
        host.update_material(self.material, &descriptor)?;
        self.descriptor = descriptor;
        Ok(())
    }

    /// Detach from `scene` and release primitive, material and shape.
    ///
    /// Every step is attempted; the first failure is returned.
    pub fn release(mut self, host: &mut dyn RenderHost, scene: SceneId) -> Result<(), HostError> {
        let steps = [
            host.remove_from_scene(scene, self.primitive),
            host.release_primitive(self.primitive),
            host.release_material(self.material),
            self.slot.release(host),
        ];
        steps.into_iter().collect()
    }
}

fn log_cleanup(result: Result<(), HostError>) {
    if let Err(err) = result {
        log::warn!("Cleanup after failed allocation did not complete: {}", err);
    }
}
