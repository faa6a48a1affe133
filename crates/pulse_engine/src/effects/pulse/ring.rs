//! Expanding ring: growth/fade state machine plus its host primitive

use super::primitive::PulsePrimitive;
use crate::foundation::collections::{PrimitiveHandle, SceneId};
use crate::foundation::math::utils::saturate;
use crate::host::{HostError, RenderHost};
use crate::render::{CircleShape, Color, MaterialDescriptor};

/// Radius a ring collapses to. Never zero, so the shape is never degenerate.
pub const RING_EPSILON_RADIUS: f32 = 0.01;

/// Where a ring is in its growth cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPhase {
    /// At the epsilon radius
    Collapsed,
    /// Between epsilon and the target radius
    Growing,
    /// Reached the target; the next active frame resets it
    AtTarget,
}

/// Radius and opacity of one ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingState {
    current_radius: f32,
    target_radius: f32,
    opacity: f32,
}

impl RingState {
    /// Ring at `radius`, invisible until the first active frame
    pub fn new(radius: f32, target_radius: f32) -> Self {
        Self {
            current_radius: radius.max(RING_EPSILON_RADIUS),
            target_radius,
            opacity: 0.0,
        }
    }

    /// Ring starting at the epsilon radius
    pub fn collapsed(target_radius: f32) -> Self {
        Self::new(RING_EPSILON_RADIUS, target_radius)
    }

    /// Ring starting half way to its target
    pub fn half_grown(target_radius: f32) -> Self {
        Self::new(target_radius * 0.5, target_radius)
    }

    /// Current radius
    pub fn current_radius(&self) -> f32 {
        self.current_radius
    }

    /// Radius the ring grows to
    pub fn target_radius(&self) -> f32 {
        self.target_radius
    }

    /// Current opacity
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Phase derived from the current radius
    pub fn phase(&self) -> RingPhase {
        if self.current_radius >= self.target_radius {
            RingPhase::AtTarget
        } else if self.current_radius <= RING_EPSILON_RADIUS {
            RingPhase::Collapsed
        } else {
            RingPhase::Growing
        }
    }

    /// One active frame: grow and fade, or reset once the target is reached
    pub fn advance(&mut self, growth_rate: f32) {
        if self.current_radius < self.target_radius {
            self.current_radius += growth_rate;
            self.opacity = saturate(1.0 - self.current_radius / self.target_radius);
        } else {
            self.current_radius = RING_EPSILON_RADIUS;
            self.opacity = 1.0;
        }
    }

    /// Force the ring invisible, keeping its radius
    pub fn hide(&mut self) {
        self.opacity = 0.0;
    }

    /// Change the radius the ring grows to. The current radius is kept.
    pub fn retarget(&mut self, target_radius: f32) {
        self.target_radius = target_radius;
    }
}

/// A ring primitive driven by a [`RingState`]
#[derive(Debug)]
pub struct ExpandingRing {
    primitive: PulsePrimitive,
    state: RingState,
}

impl ExpandingRing {
    /// Allocate the ring's primitive at the state's radius, with the state's opacity
    pub fn build(
        host: &mut dyn RenderHost,
        state: RingState,
        segments: u32,
        color: Color,
    ) -> Result<Self, HostError> {
        let primitive = PulsePrimitive::build(
            host,
            CircleShape::new(state.current_radius(), segments),
            MaterialDescriptor::translucent(color, state.opacity()),
        )?;
        Ok(Self { primitive, state })
    }

    /// Growth state
    pub fn state(&self) -> RingState {
        self.state
    }

    /// Host primitive handle
    pub fn handle(&self) -> PrimitiveHandle {
        self.primitive.handle()
    }

    /// Underlying primitive
    pub fn primitive(&self) -> &PulsePrimitive {
        &self.primitive
    }

    /// Advance one active frame and rebuild the shape at the new radius.
    ///
    /// The state is only committed once the new shape is bound.
    pub fn advance(&mut self, host: &mut dyn RenderHost, growth_rate: f32, segments: u32) -> Result<(), HostError> {
        let mut next = self.state;
        next.advance(growth_rate);

        self.primitive
            .reshape(host, CircleShape::new(next.current_radius(), segments))?;
        self.state = next;
        log::trace!(
            "Ring {:?} -> radius {:.3}, opacity {:.3} ({:?})",
            self.primitive.handle(),
            next.current_radius(),
            next.opacity(),
            next.phase()
        );
        self.primitive.set_opacity(host, next.opacity())
    }

    /// Hide the ring immediately
    pub fn hide(&mut self, host: &mut dyn RenderHost) -> Result<(), HostError> {
        self.state.hide();
        self.primitive.set_opacity(host, 0.0)
    }

    /// Retint the ring
    pub fn set_color(&mut self, host: &mut dyn RenderHost, color: Color) -> Result<(), HostError> {
        self.primitive.set_color(host, color)
    }

    /// Change the radius the ring grows to
    pub fn retarget(&mut self, target_radius: f32) {
        self.state.retarget(target_radius);
    }

    /// Release everything the ring owns
    pub fn release(self, host: &mut dyn RenderHost, scene: SceneId) -> Result<(), HostError> {
        self.primitive.release(host, scene)
    }
}
