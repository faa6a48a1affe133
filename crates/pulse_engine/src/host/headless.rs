//! Headless host - in-memory scene, resource tables and frame queue
//!
//! Mirrors what a GPU-backed engine does with its resources without touching a
//! device: shape buffers are really tessellated and their byte size is tracked
//! against an optional memory budget, so leaks and allocation failures are
//! observable from tests.

use super::{FrameCallback, FrameScheduler, HostError, PrimitiveFactory, Renderer, Scene};
use crate::foundation::collections::{
    CameraId, FrameRequestId, MaterialHandle, PrimitiveHandle, SceneId, ShapeHandle, SlotMap,
};
use crate::foundation::math::Transform;
use crate::render::{CircleGeometry, CircleShape, Color, MaterialDescriptor};
use std::collections::HashSet;

/// Configuration for the headless host
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Shape memory budget in bytes (0 = unlimited)
    pub memory_budget: usize,
}

/// Resource accounting snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// Shapes currently resident
    pub live_shapes: usize,
    /// Materials currently resident
    pub live_materials: usize,
    /// Primitives currently resident
    pub live_primitives: usize,
    /// Shapes created since startup
    pub shapes_created: u64,
    /// Shapes released since startup
    pub shapes_released: u64,
    /// Bytes held by resident shape buffers
    pub bytes_resident: usize,
    /// Completed render calls
    pub frames_rendered: u64,
}

/// One primitive as it was drawn by the last render call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Primitive drawn
    pub primitive: PrimitiveHandle,
    /// Radius of its shape
    pub radius: f32,
    /// Segment count of its shape
    pub segments: u32,
    /// Material tint
    pub color: Color,
    /// Material opacity
    pub opacity: f32,
    /// World placement
    pub transform: Transform,
}

#[derive(Debug, Clone)]
struct PrimitiveRecord {
    shape: ShapeHandle,
    material: MaterialHandle,
    transform: Transform,
}

/// In-memory [`RenderHost`](super::RenderHost)
pub struct HeadlessHost {
    config: HeadlessConfig,
    shapes: SlotMap<ShapeHandle, CircleGeometry>,
    materials: SlotMap<MaterialHandle, MaterialDescriptor>,
    primitives: SlotMap<PrimitiveHandle, PrimitiveRecord>,
    scenes: SlotMap<SceneId, Vec<PrimitiveHandle>>,
    cameras: SlotMap<CameraId, Transform>,

    pending: Vec<(FrameRequestId, FrameCallback)>,
    /// Requests of the batch currently being dispatched that were not cancelled
    dispatching: HashSet<FrameRequestId>,
    next_request: u64,

    stats: ResourceStats,
    last_draw: Vec<DrawRecord>,
    render_fault: Option<String>,
}

impl HeadlessHost {
    /// Create a headless host with default configuration
    pub fn new() -> Self {
        Self::with_config(HeadlessConfig::default())
    }

    /// Create a headless host with custom configuration
    pub fn with_config(config: HeadlessConfig) -> Self {
        log::debug!("Creating HeadlessHost with config: {:?}", config);
        Self {
            config,
            shapes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            primitives: SlotMap::with_key(),
            scenes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            pending: Vec::new(),
            dispatching: HashSet::new(),
            next_request: 0,
            stats: ResourceStats::default(),
            last_draw: Vec::new(),
            render_fault: None,
        }
    }

    /// Create an empty scene
    pub fn create_scene(&mut self) -> SceneId {
        self.scenes.insert(Vec::new())
    }

    /// Create a camera with the given view transform
    pub fn create_camera(&mut self, transform: Transform) -> CameraId {
        self.cameras.insert(transform)
    }

    /// Change the shape memory budget (0 = unlimited)
    pub fn set_memory_budget(&mut self, bytes: usize) {
        self.config.memory_budget = bytes;
    }

    /// Make every subsequent render call fail with `reason` (None clears it)
    pub fn set_render_fault(&mut self, reason: Option<String>) {
        self.render_fault = reason;
    }

    /// Run every callback requested before this call. Returns how many ran.
    ///
    /// Callbacks requested while pumping are queued for the next pump, which
    /// is what a browser-style animation frame loop does.
    pub fn pump_frame(&mut self) -> usize {
        let batch = std::mem::take(&mut self.pending);
        self.dispatching = batch.iter().map(|(id, _)| *id).collect();

        let mut ran = 0;
        for (id, callback) in batch {
            // A callback earlier in the batch may have cancelled this one
            if !self.dispatching.remove(&id) {
                continue;
            }
            callback(self);
            ran += 1;
        }
        self.dispatching.clear();
        ran
    }

    /// Pump `frames` frames, returning the total number of callbacks run
    pub fn run_frames(&mut self, frames: usize) -> usize {
        (0..frames).map(|_| self.pump_frame()).sum()
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Current resource accounting
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            live_shapes: self.shapes.len(),
            live_materials: self.materials.len(),
            live_primitives: self.primitives.len(),
            ..self.stats
        }
    }

    /// Draw list captured by the last successful render
    pub fn last_draw(&self) -> &[DrawRecord] {
        &self.last_draw
    }

    /// Primitives currently attached to `scene`
    pub fn scene_primitives(&self, scene: SceneId) -> &[PrimitiveHandle] {
        self.scenes.get(scene).map(Vec::as_slice).unwrap_or_default()
    }

    /// Geometry currently bound to `primitive`
    pub fn primitive_shape(&self, primitive: PrimitiveHandle) -> Option<&CircleGeometry> {
        let record = self.primitives.get(primitive)?;
        self.shapes.get(record.shape)
    }

    /// Material currently bound to `primitive`
    pub fn primitive_material(&self, primitive: PrimitiveHandle) -> Option<&MaterialDescriptor> {
        let record = self.primitives.get(primitive)?;
        self.materials.get(record.material)
    }

    /// Placement of `primitive`
    pub fn primitive_transform(&self, primitive: PrimitiveHandle) -> Option<&Transform> {
        self.primitives.get(primitive).map(|record| &record.transform)
    }

    fn draw_record(&self, primitive: PrimitiveHandle) -> Option<DrawRecord> {
        let record = self.primitives.get(primitive)?;
        let geometry = self.shapes.get(record.shape)?;
        let material = self.materials.get(record.material)?;
        Some(DrawRecord {
            primitive,
            radius: geometry.bounding_radius(),
            segments: geometry.shape().segments,
            color: material.color,
            opacity: material.opacity,
            transform: record.transform.clone(),
        })
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for HeadlessHost {
    fn add_to_scene(&mut self, scene: SceneId, primitive: PrimitiveHandle) -> Result<(), HostError> {
        if !self.primitives.contains_key(primitive) {
            return Err(HostError::UnknownHandle { kind: "primitive" });
        }
        let members = self.scenes.get_mut(scene).ok_or(HostError::UnknownScene)?;
        if !members.contains(&primitive) {
            members.push(primitive);
        }
        Ok(())
    }

    fn remove_from_scene(&mut self, scene: SceneId, primitive: PrimitiveHandle) -> Result<(), HostError> {
        let members = self.scenes.get_mut(scene).ok_or(HostError::UnknownScene)?;
        members.retain(|p| *p != primitive);
        Ok(())
    }
}

impl PrimitiveFactory for HeadlessHost {
    fn create_shape(&mut self, shape: CircleShape) -> Result<ShapeHandle, HostError> {
        if !shape.is_valid() {
            return Err(HostError::AllocationFailed(format!(
                "degenerate circle (radius {}, segments {})",
                shape.radius, shape.segments
            )));
        }

        let requested = shape.byte_size().ok_or_else(|| {
            HostError::AllocationFailed(format!("circle with {} segments overflows buffer size", shape.segments))
        })?;
        if self.config.memory_budget > 0 {
            let available = self.config.memory_budget.saturating_sub(self.stats.bytes_resident);
            if requested > available {
                log::warn!("Shape allocation of {} bytes exceeds budget ({} available)", requested, available);
                return Err(HostError::MemoryBudgetExceeded { requested, available });
            }
        }

        let geometry = CircleGeometry::try_build(shape)
            .map_err(|err| HostError::AllocationFailed(format!("circle buffers of {requested} bytes: {err}")))?;

        self.stats.bytes_resident += requested;
        self.stats.shapes_created += 1;
        Ok(self.shapes.insert(geometry))
    }

    fn release_shape(&mut self, shape: ShapeHandle) -> Result<(), HostError> {
        let geometry = self
            .shapes
            .remove(shape)
            .ok_or(HostError::UnknownHandle { kind: "shape" })?;
        self.stats.bytes_resident = self.stats.bytes_resident.saturating_sub(geometry.byte_size());
        self.stats.shapes_released += 1;
        Ok(())
    }

    fn create_material(&mut self, material: &MaterialDescriptor) -> Result<MaterialHandle, HostError> {
        Ok(self.materials.insert(*material))
    }

    fn update_material(
        &mut self,
        material: MaterialHandle,
        descriptor: &MaterialDescriptor,
    ) -> Result<(), HostError> {
        let slot = self
            .materials
            .get_mut(material)
            .ok_or(HostError::UnknownHandle { kind: "material" })?;
        *slot = *descriptor;
        Ok(())
    }

    fn release_material(&mut self, material: MaterialHandle) -> Result<(), HostError> {
        self.materials
            .remove(material)
            .map(|_| ())
            .ok_or(HostError::UnknownHandle { kind: "material" })
    }

    fn create_primitive(
        &mut self,
        shape: ShapeHandle,
        material: MaterialHandle,
    ) -> Result<PrimitiveHandle, HostError> {
        if !self.shapes.contains_key(shape) {
            return Err(HostError::UnknownHandle { kind: "shape" });
        }
        if !self.materials.contains_key(material) {
            return Err(HostError::UnknownHandle { kind: "material" });
        }
        Ok(self.primitives.insert(PrimitiveRecord {
            shape,
            material,
            transform: Transform::identity(),
        }))
    }

    fn set_primitive_shape(&mut self, primitive: PrimitiveHandle, shape: ShapeHandle) -> Result<(), HostError> {
        if !self.shapes.contains_key(shape) {
            return Err(HostError::UnknownHandle { kind: "shape" });
        }
        let record = self
            .primitives
            .get_mut(primitive)
            .ok_or(HostError::UnknownHandle { kind: "primitive" })?;
        record.shape = shape;
        Ok(())
    }

    fn set_placement(&mut self, primitives: &[PrimitiveHandle], transform: &Transform) -> Result<(), HostError> {
        if primitives.iter().any(|p| !self.primitives.contains_key(*p)) {
            return Err(HostError::UnknownHandle { kind: "primitive" });
        }
        for primitive in primitives {
            if let Some(record) = self.primitives.get_mut(*primitive) {
                record.transform = transform.clone();
            }
        }
        Ok(())
    }

    fn release_primitive(&mut self, primitive: PrimitiveHandle) -> Result<(), HostError> {
        self.primitives
            .remove(primitive)
            .ok_or(HostError::UnknownHandle { kind: "primitive" })?;
        for members in self.scenes.values_mut() {
            members.retain(|p| *p != primitive);
        }
        Ok(())
    }
}

impl FrameScheduler for HeadlessHost {
    fn request_frame(&mut self, callback: FrameCallback) -> FrameRequestId {
        self.next_request += 1;
        let id = FrameRequestId(self.next_request);
        self.pending.push((id, callback));
        id
    }

    fn cancel_frame(&mut self, request: FrameRequestId) -> bool {
        if let Some(index) = self.pending.iter().position(|(id, _)| *id == request) {
            // Dropping the callback releases whatever it captured
            drop(self.pending.remove(index));
            return true;
        }
        self.dispatching.remove(&request)
    }
}

impl Renderer for HeadlessHost {
    fn render(&mut self, scene: SceneId, camera: CameraId) -> Result<(), HostError> {
        if !self.cameras.contains_key(camera) {
            return Err(HostError::UnknownScene);
        }
        if let Some(reason) = &self.render_fault {
            return Err(HostError::RenderFailed(reason.clone()));
        }

        let members = self.scenes.get(scene).ok_or(HostError::UnknownScene)?.clone();
        self.last_draw = members.into_iter().filter_map(|p| self.draw_record(p)).collect();
        self.stats.frames_rendered += 1;
        Ok(())
    }
}
