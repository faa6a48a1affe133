//! Pulse demo application
//!
//! Drives a pulse emitter on the headless host for a few hundred frames,
//! exercising every control: orbiting placement, pause/resume, retint, resize
//! and disposal. Pass a `.toml` or `.ron` settings file as the first argument
//! to override the defaults.

use pulse_engine::config::{Config, ConfigError};
use pulse_engine::effects::pulse::{PulseEmitter, PulseError, PulseSettings};
use pulse_engine::foundation::math::{constants::TAU, Transform, Vec3};
use pulse_engine::foundation::logging;
use pulse_engine::foundation::time::Timer;
use pulse_engine::host::{HeadlessHost, RenderTarget};
use pulse_engine::render::Color;
use thiserror::Error;

// Demo script, in frames
const ORBIT_FRAMES: usize = 240;
const PAUSE_FRAMES: usize = 30;
const RESUME_FRAMES: usize = 120;
const ORBIT_RADIUS: f32 = 4.0;

#[derive(Debug, Error)]
enum DemoError {
    #[error("Settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("Pulse: {0}")]
    Pulse(#[from] PulseError),
}

fn load_settings() -> Result<PulseSettings, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading pulse settings from {}", path);
            Ok(PulseSettings::load_from_file(&path)?)
        }
        None => Ok(PulseSettings::default().with_radius(3.0).with_growth_rate(0.05)),
    }
}

fn run() -> Result<(), DemoError> {
    let settings = load_settings()?;
    log::info!("Settings: {:?}", settings);

    let mut host = HeadlessHost::new();
    let scene = host.create_scene();
    let camera = host.create_camera(Transform::from_position_rotation(
        Vec3::new(0.0, 5.0, 12.0),
        pulse_engine::foundation::math::Quat::identity(),
    ));

    let mut pulse = PulseEmitter::new(&mut host, RenderTarget::new(scene, camera), settings)?;
    pulse.begin(&mut host)?;

    let mut timer = Timer::new();
    let centre = pulse.placement().position;
    for frame in 0..ORBIT_FRAMES {
        let angle = TAU * frame as f32 / ORBIT_FRAMES as f32;
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * ORBIT_RADIUS;
        pulse.set_position(&mut host, centre + offset)?;
        host.pump_frame();
        timer.update();

        if frame % 60 == 0 {
            let status = pulse.status()?;
            log::info!(
                "frame {:>4}: rings at {:.2} / {:.2} (opacity {:.2} / {:.2})",
                frame,
                status.rings[0].current_radius(),
                status.rings[1].current_radius(),
                status.rings[0].opacity(),
                status.rings[1].opacity(),
            );
        }
    }

    log::info!("Pausing pulse for {} frames", PAUSE_FRAMES);
    pulse.stop(&mut host)?;
    host.run_frames(PAUSE_FRAMES);

    log::info!("Resuming with a warmer tint and a larger disc");
    pulse.set_color(&mut host, Color::from_hex(0xff6a00))?;
    pulse.set_radius(&mut host, pulse.settings().radius * 1.5)?;
    pulse.set_segments(&mut host, 64)?;
    pulse.begin(&mut host)?;
    for _ in 0..RESUME_FRAMES {
        host.pump_frame();
        timer.update();
    }

    let status = pulse.status()?;
    log::info!(
        "Advanced {} frames ({:.0} fps average), {} draws in the last frame",
        status.frames_advanced,
        timer.average_fps(),
        host.last_draw().len()
    );

    pulse.dispose(&mut host)?;
    let stats = host.stats();
    log::info!(
        "Shapes created {}, released {}, resident {} ({} bytes); {} frames rendered",
        stats.shapes_created,
        stats.shapes_released,
        stats.live_shapes,
        stats.bytes_resident,
        stats.frames_rendered
    );

    Ok(())
}

fn main() {
    logging::init_with_level(log::LevelFilter::Info);

    log::info!("Starting pulse demo");
    if let Err(err) = run() {
        log::error!("Pulse demo failed: {}", err);
        std::process::exit(1);
    }
}
