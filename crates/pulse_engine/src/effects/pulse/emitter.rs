//! Pulse emitter - lifecycle control and the per-frame hook
//!
//! Two flags drive the emitter:
//! - `scheduled`: a frame callback is armed with the host. Set by the first
//!   `begin`, cleared only by `dispose` or by a frame fault.
//! - `active`: the rings advance on each frame. Toggled by `begin` / `stop`.
//!
//! The hook renders every frame it runs, active or not, because the host scene
//! still needs redrawing while the pulse is paused.

use super::disc::StaticDisc;
use super::error::{PulseError, PulseResult};
use super::placement::Placement;
use super::ring::{ExpandingRing, RingState};
use super::settings::{
    validate_growth_rate, validate_placement, validate_progress, validate_radius, validate_segments,
    PulseSettings,
};
use crate::foundation::collections::{FrameRequestId, PrimitiveHandle};
use crate::foundation::math::Vec3;
use crate::host::{HostError, RenderHost, RenderTarget};
use crate::render::Color;
use std::cell::RefCell;
use std::rc::Rc;

/// Snapshot of a live emitter
#[derive(Debug, Clone, PartialEq)]
pub struct PulseStatus {
    /// Rings advance on each frame
    pub active: bool,
    /// A frame callback is armed
    pub scheduled: bool,
    /// Active frames processed so far
    pub frames_advanced: u64,
    /// State of both rings, collapsed-start ring first
    pub rings: [RingState; 2],
    /// Current disc radius
    pub disc_radius: f32,
    /// Current disc segment count
    pub disc_segments: u32,
}

/// The three live primitives. Held as one value so they exist all together or not at all.
#[derive(Debug)]
struct PulseParts {
    disc: StaticDisc,
    rings: [ExpandingRing; 2],
}

impl PulseParts {
    fn build(host: &mut dyn RenderHost, target: RenderTarget, settings: &PulseSettings) -> Result<Self, HostError> {
        let disc = StaticDisc::build(host, settings.radius, settings.segments, settings.color)?;

        let first = match ExpandingRing::build(
            host,
            RingState::collapsed(settings.radius),
            settings.segments,
            settings.color,
        ) {
            Ok(ring) => ring,
            Err(err) => {
                log_teardown(disc.release(host, target.scene));
                return Err(err);
            }
        };

        let second = match ExpandingRing::build(
            host,
            RingState::half_grown(settings.radius),
            settings.segments,
            settings.color,
        ) {
            Ok(ring) => ring,
            Err(err) => {
                log_teardown(first.release(host, target.scene));
                log_teardown(disc.release(host, target.scene));
                return Err(err);
            }
        };

        let parts = Self { disc, rings: [first, second] };
        let primitives = parts.primitives();
        let registered = host
            .set_placement(&primitives, &settings.placement().to_transform())
            .and_then(|()| {
                primitives
                    .iter()
                    .try_for_each(|p| host.add_to_scene(target.scene, *p))
            });

        if let Err(err) = registered {
            log_teardown(parts.release(host, target));
            return Err(err);
        }
        Ok(parts)
    }

    fn primitives(&self) -> [PrimitiveHandle; 3] {
        [self.disc.handle(), self.rings[0].handle(), self.rings[1].handle()]
    }

    fn hide_rings(&mut self, host: &mut dyn RenderHost) -> Result<(), HostError> {
        self.rings.iter_mut().try_for_each(|ring| ring.hide(host))
    }

    fn release(self, host: &mut dyn RenderHost, target: RenderTarget) -> Result<(), HostError> {
        let [first, second] = self.rings;
        let steps = [
            self.disc.release(host, target.scene),
            first.release(host, target.scene),
            second.release(host, target.scene),
        ];
        steps.into_iter().collect()
    }
}

#[derive(Debug)]
struct EmitterState {
    target: RenderTarget,
    settings: PulseSettings,
    parts: Option<PulseParts>,
    active: bool,
    hook: Option<FrameRequestId>,
    disposed: bool,
    /// The owning handle was dropped without disposal; the hook must stop re-arming
    orphaned: bool,
    frames_advanced: u64,
    last_fault: Option<PulseError>,
}

impl EmitterState {
    fn parts_mut(&mut self, operation: &'static str) -> PulseResult<&mut PulseParts> {
        if self.disposed {
            return Err(PulseError::OperationAfterDispose { operation });
        }
        self.parts
            .as_mut()
            .ok_or(PulseError::OperationAfterDispose { operation })
    }

    fn ensure_live(&self, operation: &'static str) -> PulseResult<()> {
        if self.disposed || self.parts.is_none() {
            Err(PulseError::OperationAfterDispose { operation })
        } else {
            Ok(())
        }
    }

    /// One hook invocation: advance when active, then render unconditionally
    fn frame(&mut self, host: &mut dyn RenderHost) -> PulseResult<()> {
        if self.active {
            let growth_rate = self.settings.growth_rate;
            let segments = self.settings.segments;
            let parts = self.parts_mut("frame")?;
            for ring in &mut parts.rings {
                ring.advance(host, growth_rate, segments)?;
            }
            self.frames_advanced += 1;
        }
        host.render(self.target.scene, self.target.camera)?;
        Ok(())
    }
}

/// Arm the hook for the next host frame
fn schedule_hook(handle: Rc<RefCell<EmitterState>>, host: &mut dyn RenderHost) -> FrameRequestId {
    host.request_frame(Box::new(move |host: &mut dyn RenderHost| run_hook(handle, host)))
}

fn run_hook(handle: Rc<RefCell<EmitterState>>, host: &mut dyn RenderHost) {
    let mut state = handle.borrow_mut();
    if state.disposed || state.orphaned {
        state.hook = None;
        log::debug!("Pulse hook fired after teardown; not re-arming");
        return;
    }

    match state.frame(host) {
        Ok(()) => {
            let next = schedule_hook(Rc::clone(&handle), host);
            state.hook = Some(next);
        }
        Err(err) => {
            log::error!("Pulse frame failed, stopping the frame hook: {}", err);
            state.hook = None;
            state.active = false;
            state.last_fault = Some(err);
        }
    }
}

fn log_teardown(result: Result<(), HostError>) {
    if let Err(err) = result {
        log::warn!("Pulse teardown did not complete cleanly: {}", err);
    }
}

/// A disc with two expanding, fading rings, anchored at a [`Placement`]
///
/// All operations run on the thread that drives the host's frame loop.
///
/// # Example
///
/// ```rust
/// use pulse_engine::prelude::*;
///
/// let mut host = HeadlessHost::new();
/// let scene = host.create_scene();
/// let camera = host.create_camera(Transform::identity());
///
/// let settings = PulseSettings::default().with_radius(10.0).with_growth_rate(1.0);
/// let mut pulse = PulseEmitter::new(&mut host, RenderTarget::new(scene, camera), settings)?;
///
/// pulse.begin(&mut host)?;
/// host.run_frames(3);
/// assert_eq!(pulse.status()?.frames_advanced, 3);
///
/// pulse.dispose(&mut host)?;
/// assert_eq!(host.stats().live_shapes, 0);
/// # Ok::<(), PulseError>(())
/// ```
pub struct PulseEmitter {
    state: Rc<RefCell<EmitterState>>,
}

impl PulseEmitter {
    /// Validate `settings`, allocate the disc and both rings, place them and
    /// attach them to `target.scene`.
    ///
    /// Invalid settings are rejected before the host is touched. If the host
    /// fails part way through, everything already allocated is released.
    pub fn new(host: &mut dyn RenderHost, target: RenderTarget, settings: PulseSettings) -> PulseResult<Self> {
        settings.validate()?;
        let parts = PulseParts::build(host, target, &settings)?;

        log::info!(
            "Pulse emitter created: radius {}, {} segments, growth {}/frame",
            settings.radius,
            settings.segments,
            settings.growth_rate
        );

        Ok(Self {
            state: Rc::new(RefCell::new(EmitterState {
                target,
                settings,
                parts: Some(parts),
                active: false,
                hook: None,
                disposed: false,
                orphaned: false,
                frames_advanced: 0,
                last_fault: None,
            })),
        })
    }

    /// Start pulsing. Arms the frame hook on first call; later calls only
    /// re-affirm the active flag.
    pub fn begin(&mut self, host: &mut dyn RenderHost) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        state.ensure_live("begin")?;

        if state.hook.is_none() {
            let request = schedule_hook(Rc::clone(&self.state), host);
            log::debug!("Pulse hook armed ({})", request);
            state.hook = Some(request);
            state.last_fault = None;
        }
        state.active = true;
        Ok(())
    }

    /// Stop pulsing and hide both rings now. The hook keeps rendering each frame.
    pub fn stop(&mut self, host: &mut dyn RenderHost) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        state.active = false;
        state.parts_mut("stop")?.hide_rings(host)?;
        Ok(())
    }

    /// Move and orient all three primitives in one host call
    pub fn set_placement(&mut self, host: &mut dyn RenderHost, placement: Placement) -> PulseResult<()> {
        self.place(host, placement, "set_placement")
    }

    fn place(&mut self, host: &mut dyn RenderHost, placement: Placement, operation: &'static str) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        let parts = state.parts_mut(operation)?;
        validate_placement(&placement)?;

        host.set_placement(&parts.primitives(), &placement.to_transform())?;
        state.settings.position = placement.position;
        state.settings.rotation = placement.rotation;
        Ok(())
    }

    /// Move all three primitives, keeping the current rotation
    pub fn set_position(&mut self, host: &mut dyn RenderHost, position: Vec3) -> PulseResult<()> {
        let rotation = self.state.borrow().settings.rotation;
        self.place(host, Placement::new(position, rotation), "set_position")
    }

    /// Rotate all three primitives, keeping the current position
    pub fn set_rotation(&mut self, host: &mut dyn RenderHost, rotation: Vec3) -> PulseResult<()> {
        let position = self.state.borrow().settings.position;
        self.place(host, Placement::new(position, rotation), "set_rotation")
    }

    /// Resize the disc now and retarget both rings to the new radius.
    ///
    /// Ring radii in flight are kept; a ring already past the new radius
    /// resets on its next active frame.
    pub fn set_radius(&mut self, host: &mut dyn RenderHost, radius: f32) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        let segments = state.settings.segments;
        let growth_rate = state.settings.growth_rate;
        let parts = state.parts_mut("set_radius")?;
        validate_radius(radius)?;
        validate_progress(radius, growth_rate)?;

        parts.disc.reshape(host, radius, segments)?;
        for ring in &mut parts.rings {
            ring.retarget(radius);
        }
        state.settings.radius = radius;
        Ok(())
    }

    /// Retessellate the disc now. Rings pick the new count up on their next rebuild.
    pub fn set_segments(&mut self, host: &mut dyn RenderHost, segments: u32) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        let radius = state.settings.radius;
        let parts = state.parts_mut("set_segments")?;
        validate_segments(segments)?;

        parts.disc.reshape(host, radius, segments)?;
        state.settings.segments = segments;
        Ok(())
    }

    /// Change the ring growth per frame, effective from the next frame
    pub fn set_growth_rate(&mut self, growth_rate: f32) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        state.ensure_live("set_growth_rate")?;
        validate_growth_rate(growth_rate)?;
        validate_progress(state.settings.radius, growth_rate)?;
        state.settings.growth_rate = growth_rate;
        Ok(())
    }

    /// Retint all three primitives. Radii and opacities are untouched.
    pub fn set_color(&mut self, host: &mut dyn RenderHost, color: Color) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        let parts = state.parts_mut("set_color")?;

        parts.disc.set_color(host, color)?;
        for ring in &mut parts.rings {
            ring.set_color(host, color)?;
        }
        state.settings.color = color;
        Ok(())
    }

    /// Stop, cancel the frame hook, detach and release all three primitives.
    ///
    /// After this returns the hook never fires again and every other operation
    /// fails with [`PulseError::OperationAfterDispose`]. Calling it again does nothing.
    pub fn dispose(&mut self, host: &mut dyn RenderHost) -> PulseResult<()> {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            log::debug!("Pulse emitter already disposed");
            return Ok(());
        }

        state.active = false;
        if let Some(parts) = state.parts.as_mut() {
            log_teardown(parts.hide_rings(host));
        }
        if let Some(request) = state.hook.take() {
            if !host.cancel_frame(request) {
                log::debug!("Pulse hook {} was not pending at dispose", request);
            }
        }
        state.disposed = true;

        let target = state.target;
        let released = match state.parts.take() {
            Some(parts) => parts.release(host, target),
            None => Ok(()),
        };
        log::info!("Pulse emitter disposed after {} active frames", state.frames_advanced);
        released.map_err(PulseError::from)
    }

    /// Whether the rings advance each frame
    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    /// Whether a frame hook is armed
    pub fn is_scheduled(&self) -> bool {
        self.state.borrow().hook.is_some()
    }

    /// Whether [`PulseEmitter::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Error that stopped the frame hook, if any. Cleared by the next `begin` that re-arms.
    pub fn last_fault(&self) -> Option<PulseError> {
        self.state.borrow().last_fault.clone()
    }

    /// Current settings, including changes made through the setters
    pub fn settings(&self) -> PulseSettings {
        self.state.borrow().settings.clone()
    }

    /// Current placement
    pub fn placement(&self) -> Placement {
        self.state.borrow().settings.placement()
    }

    /// Render target the emitter draws into
    pub fn target(&self) -> RenderTarget {
        self.state.borrow().target
    }

    /// Host handles of the disc and both rings, in that order
    pub fn primitives(&self) -> PulseResult<[PrimitiveHandle; 3]> {
        let mut state = self.state.borrow_mut();
        Ok(state.parts_mut("primitives")?.primitives())
    }

    /// Snapshot of flags, ring states and disc shape
    pub fn status(&self) -> PulseResult<PulseStatus> {
        let mut state = self.state.borrow_mut();
        let active = state.active;
        let scheduled = state.hook.is_some();
        let frames_advanced = state.frames_advanced;
        let parts = state.parts_mut("status")?;
        let disc = parts.disc.shape();

        Ok(PulseStatus {
            active,
            scheduled,
            frames_advanced,
            rings: [parts.rings[0].state(), parts.rings[1].state()],
            disc_radius: disc.radius,
            disc_segments: disc.segments,
        })
    }
}

impl Drop for PulseEmitter {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.disposed {
            log::warn!("PulseEmitter dropped without dispose; its primitives stay in the scene");
            state.orphaned = true;
            state.active = false;
        }
    }
}

impl std::fmt::Debug for PulseEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PulseEmitter")
            .field("active", &state.active)
            .field("scheduled", &state.hook.is_some())
            .field("disposed", &state.disposed)
            .field("frames_advanced", &state.frames_advanced)
            .finish()
    }
}
