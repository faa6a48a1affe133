//! # Pulse Engine
//!
//! A frame-driven pulse effect for 3D scenes: a translucent disc with two
//! rings that expand from its centre while fading out, looping for as long as
//! the effect is active.
//!
//! ## Features
//!
//! - **Host-agnostic**: the scene, renderer and frame loop are traits in [`host`]
//! - **Explicit resource lifetime**: every shape rebuild releases the shape it replaces
//! - **Idempotent control**: `begin` / `stop` can be called freely, `dispose` is terminal
//! - **Headless host**: an in-memory implementation for tests and tooling
//!
//! ## Quick Start
//!
//! ```rust
//! use pulse_engine::prelude::*;
//!
//! fn main() -> Result<(), PulseError> {
//!     let mut host = HeadlessHost::new();
//!     let scene = host.create_scene();
//!     let camera = host.create_camera(Transform::identity());
//!
//!     let settings = PulseSettings::default()
//!         .with_placement(Placement::at(Vec3::new(0.0, 0.0, -5.0)))
//!         .with_color(Color::from_hex(0xff4400));
//!     let mut pulse = PulseEmitter::new(&mut host, RenderTarget::new(scene, camera), settings)?;
//!
//!     pulse.begin(&mut host)?;
//!     host.run_frames(60);
//!     pulse.stop(&mut host)?;
//!     pulse.dispose(&mut host)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod host;
pub mod render;
pub mod effects;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        effects::pulse::{
            Placement, PulseEmitter, PulseError, PulseResult, PulseSettings, PulseStatus,
            RingPhase, RingState,
        },
        foundation::math::{Transform, Vec3},
        host::{HeadlessHost, HostError, RenderHost, RenderTarget},
        render::Color,
    };
}
