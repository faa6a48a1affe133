//! Pulse effect
//!
//! A translucent disc with two rings that grow from its centre to its rim while
//! fading out, then snap back and start again. The rings are half a cycle apart
//! so there is always one ring in motion.
//!
//! ```text
//!   PulseEmitter ── Rc<RefCell<EmitterState>> ──┐
//!        │                                      │ captured by
//!        │ begin / stop / set_* / dispose       ▼
//!        │                               per-frame hook ── advance rings, render, re-arm
//!        ▼
//!   StaticDisc + ExpandingRing x2  (one shape slot each)
//! ```
//!
//! Shapes are immutable on the host side, so every radius change goes through
//! [`ShapeSlot::rebuild`]: allocate the new shape, bind it, release the old one.

mod disc;
mod emitter;
mod error;
mod placement;
mod primitive;
mod ring;
mod settings;
mod slot;

#[cfg(test)]
mod tests;

pub use disc::{StaticDisc, DISC_OPACITY};
pub use emitter::{PulseEmitter, PulseStatus};
pub use error::{PulseError, PulseResult};
pub use placement::Placement;
pub use primitive::PulsePrimitive;
pub use ring::{ExpandingRing, RingPhase, RingState, RING_EPSILON_RADIUS};
pub use settings::PulseSettings;
pub use slot::ShapeSlot;
