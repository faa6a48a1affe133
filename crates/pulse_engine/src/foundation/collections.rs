//! Handle types for host-side resource tables

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to an immutable circle shape buffer
    pub struct ShapeHandle;

    /// Handle to a material (tint, opacity, render flags)
    pub struct MaterialHandle;

    /// Handle to a renderable primitive (shape + material + placement)
    pub struct PrimitiveHandle;

    /// Handle to a scene container
    pub struct SceneId;

    /// Handle to a camera used when rendering a scene
    pub struct CameraId;
}

/// Identifier of a pending per-frame callback request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

impl std::fmt::Display for FrameRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame-request#{}", self.0)
    }
}
