//! Explicit ownership slot for an immutable host shape

use crate::foundation::collections::{PrimitiveHandle, ShapeHandle};
use crate::host::{HostError, PrimitiveFactory};
use crate::render::CircleShape;

/// Owns exactly one host shape at a time
///
/// The slot is the only place a pulse primitive's shape is created or
/// released, so the number of resident shapes per primitive is always one.
#[derive(Debug)]
pub struct ShapeSlot {
    handle: Option<ShapeHandle>,
    shape: CircleShape,
}

impl ShapeSlot {
    /// Allocate the first shape
    pub fn allocate<H: PrimitiveFactory + ?Sized>(host: &mut H, shape: CircleShape) -> Result<Self, HostError> {
        let handle = host.create_shape(shape)?;
        Ok(Self { handle: Some(handle), shape })
    }

    /// Handle of the resident shape, `None` once released
    pub fn handle(&self) -> Option<ShapeHandle> {
        self.handle
    }

    /// Descriptor of the resident shape
    pub fn shape(&self) -> CircleShape {
        self.shape
    }

    /// Replace the resident shape with one built from `shape` and bind it to `primitive`.
    ///
    /// The new shape is allocated first; on any failure the previous shape stays
    /// bound and resident. On success the previous shape is released before returning.
    pub fn rebuild<H: PrimitiveFactory + ?Sized>(
        &mut self,
        host: &mut H,
        primitive: PrimitiveHandle,
        shape: CircleShape,
    ) -> Result<(), HostError> {
        let fresh = host.create_shape(shape)?;
        if let Err(err) = host.set_primitive_shape(primitive, fresh) {
            if let Err(release_err) = host.release_shape(fresh) {
                log::warn!("Failed to release unbound shape: {}", release_err);
            }
            return Err(err);
        }

        let previous = self.handle.replace(fresh);
        self.shape = shape;
        if let Some(previous) = previous {
            host.release_shape(previous)?;
        }
        Ok(())
    }

    /// Release the resident shape. A second call is a no-op.
    pub fn release<H: PrimitiveFactory + ?Sized>(&mut self, host: &mut H) -> Result<(), HostError> {
        match self.handle.take() {
            Some(handle) => host.release_shape(handle),
            None => Ok(()),
        }
    }
}
