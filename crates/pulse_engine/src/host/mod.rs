//! Host rendering environment
//!
//! The effect never talks to a GPU directly. Everything it needs from the
//! surrounding engine is expressed through four small traits:
//!
//! - [`Scene`]: attach and detach primitives from a scene container
//! - [`PrimitiveFactory`]: allocate, swap and release shapes, materials and primitives
//! - [`FrameScheduler`]: request and cancel a callback for the next frame
//! - [`Renderer`]: draw a scene through a camera
//!
//! [`RenderHost`] is the union of the four and is what effect code receives.
//! [`HeadlessHost`] is an in-memory implementation used by tests and the demo.

pub mod headless;

pub use headless::{DrawRecord, HeadlessConfig, HeadlessHost, ResourceStats};

use crate::foundation::collections::{
    CameraId, FrameRequestId, MaterialHandle, PrimitiveHandle, SceneId, ShapeHandle,
};
use crate::foundation::math::Transform;
use crate::render::{CircleShape, MaterialDescriptor};
use thiserror::Error;

/// Errors reported by a host environment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// Resource could not be created
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    /// Allocation would exceed the host's memory budget
    #[error("Memory budget exceeded: requested {requested} bytes, available {available} bytes")]
    MemoryBudgetExceeded {
        /// Bytes the allocation needs
        requested: usize,
        /// Bytes left in the budget
        available: usize,
    },

    /// Handle was never issued or has been released
    #[error("Unknown {kind} handle")]
    UnknownHandle {
        /// Resource kind the handle refers to
        kind: &'static str,
    },

    /// Scene or camera id is not known to the host
    #[error("Unknown scene or camera")]
    UnknownScene,

    /// Drawing the scene failed
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Callback run by the host on its next frame
pub type FrameCallback = Box<dyn FnOnce(&mut dyn RenderHost)>;

/// Scene container operations
pub trait Scene {
    /// Attach a primitive to a scene
    fn add_to_scene(&mut self, scene: SceneId, primitive: PrimitiveHandle) -> Result<(), HostError>;

    /// Detach a primitive from a scene
    fn remove_from_scene(&mut self, scene: SceneId, primitive: PrimitiveHandle) -> Result<(), HostError>;
}

/// Allocation and mutation of renderable resources
///
/// Shapes are immutable once created. Changing a primitive's size means
/// creating a new shape, swapping it in with [`PrimitiveFactory::set_primitive_shape`]
/// and releasing the old one.
pub trait PrimitiveFactory {
    /// Build and upload a circle shape
    fn create_shape(&mut self, shape: CircleShape) -> Result<ShapeHandle, HostError>;

    /// Release a shape's buffers
    fn release_shape(&mut self, shape: ShapeHandle) -> Result<(), HostError>;

    /// Create a material
    fn create_material(&mut self, material: &MaterialDescriptor) -> Result<MaterialHandle, HostError>;

    /// Overwrite a material's parameters in place
    fn update_material(
        &mut self,
        material: MaterialHandle,
        descriptor: &MaterialDescriptor,
    ) -> Result<(), HostError>;

    /// Release a material
    fn release_material(&mut self, material: MaterialHandle) -> Result<(), HostError>;

    /// Create a primitive drawing `shape` with `material`
    fn create_primitive(
        &mut self,
        shape: ShapeHandle,
        material: MaterialHandle,
    ) -> Result<PrimitiveHandle, HostError>;

    /// Point a primitive at a different shape
    fn set_primitive_shape(&mut self, primitive: PrimitiveHandle, shape: ShapeHandle) -> Result<(), HostError>;

    /// Apply one transform to every listed primitive.
    ///
    /// Implementations must validate all handles before writing any of them.
    fn set_placement(&mut self, primitives: &[PrimitiveHandle], transform: &Transform) -> Result<(), HostError>;

    /// Release a primitive. Its shape and material are not released.
    fn release_primitive(&mut self, primitive: PrimitiveHandle) -> Result<(), HostError>;
}

/// Cooperative per-frame callback scheduling
pub trait FrameScheduler {
    /// Run `callback` once on the next frame
    fn request_frame(&mut self, callback: FrameCallback) -> FrameRequestId;

    /// Cancel a pending request. Returns `false` if it already ran or was unknown.
    fn cancel_frame(&mut self, request: FrameRequestId) -> bool;
}

/// Frame rendering
pub trait Renderer {
    /// Draw `scene` as seen from `camera`
    fn render(&mut self, scene: SceneId, camera: CameraId) -> Result<(), HostError>;
}

/// Everything effect code needs from the host
pub trait RenderHost: Scene + PrimitiveFactory + FrameScheduler + Renderer {}

impl<T: Scene + PrimitiveFactory + FrameScheduler + Renderer> RenderHost for T {}

/// Scene and camera an effect draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    /// Scene the primitives are attached to
    pub scene: SceneId,
    /// Camera used for the per-frame render
    pub camera: CameraId,
}

impl RenderTarget {
    /// Create a render target
    pub fn new(scene: SceneId, camera: CameraId) -> Self {
        Self { scene, camera }
    }
}
