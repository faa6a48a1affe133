//! Emitter lifecycle and animation scenarios against the headless host

use super::*;
use crate::foundation::collections::SceneId;
use crate::foundation::math::{Transform, Vec3};
use crate::host::{HeadlessHost, HostError, RenderTarget};
use crate::render::{CircleGeometry, CircleShape, Color};
use approx::assert_relative_eq;

const EPSILON: f32 = 1e-4;

fn host_with_target() -> (HeadlessHost, RenderTarget) {
    crate::foundation::logging::init_for_tests();
    let mut host = HeadlessHost::new();
    let scene = host.create_scene();
    let camera = host.create_camera(Transform::identity());
    (host, RenderTarget::new(scene, camera))
}

fn unit_rate_settings() -> PulseSettings {
    PulseSettings::default()
        .with_radius(10.0)
        .with_growth_rate(1.0)
        .with_segments(32)
}

fn ring_opacities(host: &HeadlessHost, emitter: &PulseEmitter) -> [f32; 2] {
    let [_, a, b] = emitter.primitives().unwrap();
    [
        host.primitive_material(a).unwrap().opacity,
        host.primitive_material(b).unwrap().opacity,
    ]
}

#[test]
fn test_construction_registers_three_primitives() {
    let (mut host, target) = host_with_target();
    let emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();

    let [disc, ring_a, ring_b] = emitter.primitives().unwrap();
    assert_eq!(host.scene_primitives(target.scene), &[disc, ring_a, ring_b]);

    let stats = host.stats();
    assert_eq!(stats.live_primitives, 3);
    assert_eq!(stats.live_shapes, 3);
    assert_eq!(stats.live_materials, 3);

    assert_eq!(host.primitive_material(disc).unwrap().opacity, DISC_OPACITY);
    assert_eq!(host.primitive_shape(disc).unwrap().bounding_radius(), 10.0);
    assert_eq!(host.primitive_shape(ring_a).unwrap().bounding_radius(), RING_EPSILON_RADIUS);
    assert_eq!(host.primitive_shape(ring_b).unwrap().bounding_radius(), 5.0);
    assert_eq!(ring_opacities(&host, &emitter), [0.0, 0.0]);

    // Nothing is scheduled until begin
    assert!(!emitter.is_scheduled());
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_invalid_configuration_touches_nothing() {
    let (mut host, target) = host_with_target();
    let bad = [
        unit_rate_settings().with_radius(0.0),
        unit_rate_settings().with_radius(-1.0),
        unit_rate_settings().with_segments(0),
        unit_rate_settings().with_growth_rate(-0.5),
        unit_rate_settings().with_radius(0.005),
        unit_rate_settings().with_radius(1e8),
    ];

    for settings in bad {
        let err = PulseEmitter::new(&mut host, target, settings).unwrap_err();
        assert!(matches!(err, PulseError::InvalidConfiguration { .. }));
    }

    let stats = host.stats();
    assert_eq!(stats.shapes_created, 0);
    assert_eq!(stats.live_materials, 0);
    assert!(host.scene_primitives(target.scene).is_empty());
}

#[test]
fn test_host_failure_during_construction_leaves_no_partial_state() {
    let (mut host, target) = host_with_target();
    // Room for the disc and the first ring only
    let disc = CircleGeometry::build(CircleShape::new(10.0, 32)).byte_size();
    let ring = CircleGeometry::build(CircleShape::new(RING_EPSILON_RADIUS, 32)).byte_size();
    host.set_memory_budget(disc + ring);

    let err = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap_err();
    assert!(matches!(err, PulseError::Host(HostError::MemoryBudgetExceeded { .. })));

    let stats = host.stats();
    assert_eq!(stats.live_shapes, 0);
    assert_eq!(stats.live_materials, 0);
    assert_eq!(stats.live_primitives, 0);
    assert_eq!(stats.bytes_resident, 0);
    assert!(host.scene_primitives(target.scene).is_empty());
}

#[test]
fn test_unknown_scene_releases_everything_built() {
    let (mut host, target) = host_with_target();
    let orphan_target = RenderTarget::new(SceneId::default(), target.camera);

    let err = PulseEmitter::new(&mut host, orphan_target, unit_rate_settings()).unwrap_err();
    assert_eq!(err, PulseError::Host(HostError::UnknownScene));

    let stats = host.stats();
    assert_eq!(stats.shapes_created, 3);
    assert_eq!(stats.shapes_released, 3);
    assert_eq!(stats.live_shapes, 0);
    assert_eq!(stats.live_materials, 0);
    assert_eq!(stats.live_primitives, 0);
    assert_eq!(stats.bytes_resident, 0);
    assert!(host.scene_primitives(target.scene).is_empty());
}

#[test]
fn test_ten_frames_reach_target_then_reset() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();

    let first = emitter.status().unwrap().rings[0];
    assert_eq!(first.current_radius(), RING_EPSILON_RADIUS);
    assert_eq!(first.phase(), RingPhase::Collapsed);

    host.run_frames(10);
    let ring = emitter.status().unwrap().rings[0];
    assert!(ring.current_radius() >= 10.0);
    assert_eq!(ring.phase(), RingPhase::AtTarget);

    host.run_frames(1);
    let ring = emitter.status().unwrap().rings[0];
    assert_eq!(ring.current_radius(), RING_EPSILON_RADIUS);
    assert_eq!(ring.opacity(), 1.0);

    let [_, ring_a, _] = emitter.primitives().unwrap();
    assert_eq!(host.primitive_shape(ring_a).unwrap().bounding_radius(), RING_EPSILON_RADIUS);
    assert_eq!(host.primitive_material(ring_a).unwrap().opacity, 1.0);
}

#[test]
fn test_second_ring_is_half_a_cycle_ahead() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();

    // 5 -> 10 after five frames, reset on the sixth
    host.run_frames(5);
    assert_eq!(emitter.status().unwrap().rings[1].phase(), RingPhase::AtTarget);
    host.run_frames(1);
    assert_eq!(emitter.status().unwrap().rings[1].current_radius(), RING_EPSILON_RADIUS);
}

#[test]
fn test_opacity_tracks_radius_every_frame() {
    let (mut host, target) = host_with_target();
    let settings = unit_rate_settings().with_growth_rate(0.37);
    let mut emitter = PulseEmitter::new(&mut host, target, settings).unwrap();
    emitter.begin(&mut host).unwrap();

    let mut resets = 0;
    for _ in 0..300 {
        host.pump_frame();
        let status = emitter.status().unwrap();
        let opacities = ring_opacities(&host, &emitter);
        for (ring, host_opacity) in status.rings.iter().zip(opacities) {
            let opacity = ring.opacity();
            assert!((0.0..=1.0).contains(&opacity));
            assert_eq!(opacity, host_opacity);
            if ring.current_radius() == RING_EPSILON_RADIUS {
                // Reset frame: back at epsilon, fully opaque
                assert_eq!(opacity, 1.0);
                resets += 1;
            } else if ring.current_radius() <= ring.target_radius() {
                assert_relative_eq!(opacity, 1.0 - ring.current_radius() / ring.target_radius(), epsilon = EPSILON);
            }
        }
    }
    assert!(resets > 0);
}

#[test]
fn test_begin_twice_schedules_one_hook() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();

    emitter.begin(&mut host).unwrap();
    emitter.begin(&mut host).unwrap();
    assert_eq!(host.pending_frames(), 1);

    assert_eq!(host.pump_frame(), 1);
    emitter.begin(&mut host).unwrap();
    assert_eq!(host.pending_frames(), 1);
    assert!(emitter.is_active());
    assert!(emitter.is_scheduled());
}

#[test]
fn test_stop_hides_rings_immediately_and_keeps_rendering() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(3);
    assert!(ring_opacities(&host, &emitter).iter().all(|o| *o > 0.0));

    emitter.stop(&mut host).unwrap();
    assert_eq!(ring_opacities(&host, &emitter), [0.0, 0.0]);
    assert!(!emitter.is_active());
    assert!(emitter.is_scheduled());

    let frozen = emitter.status().unwrap();
    let rendered = host.stats().frames_rendered;
    host.run_frames(4);
    let after = emitter.status().unwrap();

    assert_eq!(host.stats().frames_rendered, rendered + 4);
    assert_eq!(after.rings, frozen.rings);
    assert_eq!(after.frames_advanced, 3);
    assert_eq!(ring_opacities(&host, &emitter), [0.0, 0.0]);
}

#[test]
fn test_stop_without_begin() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();

    emitter.stop(&mut host).unwrap();
    let status = emitter.status().unwrap();
    assert_eq!(status.rings[0].current_radius(), RING_EPSILON_RADIUS);
    assert_eq!(status.rings[1].current_radius(), 5.0);
    assert_eq!(ring_opacities(&host, &emitter), [0.0, 0.0]);
    assert!(!status.scheduled);
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_restart_after_stop_continues_cycle() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(2);
    emitter.stop(&mut host).unwrap();
    host.run_frames(2);

    emitter.begin(&mut host).unwrap();
    assert_eq!(host.pending_frames(), 1);
    host.run_frames(1);
    assert_relative_eq!(emitter.status().unwrap().rings[0].current_radius(), 3.01, epsilon = EPSILON);
}

#[test]
fn test_ring_resources_do_not_accumulate() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    let resident = host.stats().bytes_resident;
    emitter.begin(&mut host).unwrap();

    host.run_frames(5_000);

    let stats = host.stats();
    assert_eq!(stats.live_shapes, 3);
    assert_eq!(stats.shapes_created - stats.shapes_released, 3);
    assert_eq!(stats.shapes_created, 3 + 2 * 5_000);
    assert_eq!(stats.bytes_resident, resident);
}

#[test]
fn test_set_color_retints_without_touching_shape_or_opacity() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(4);

    let before = emitter.status().unwrap();
    let opacities = ring_opacities(&host, &emitter);
    let red = Color::from_hex(0xff0000);
    emitter.set_color(&mut host, red).unwrap();

    for primitive in emitter.primitives().unwrap() {
        assert_eq!(host.primitive_material(primitive).unwrap().color, red);
    }
    assert_eq!(emitter.status().unwrap(), before);
    assert_eq!(ring_opacities(&host, &emitter), opacities);
    let [disc, ..] = emitter.primitives().unwrap();
    assert_eq!(host.primitive_material(disc).unwrap().opacity, DISC_OPACITY);
    assert_eq!(emitter.settings().color, red);
}

#[test]
fn test_set_placement_moves_all_primitives() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();

    let placement = Placement::new(Vec3::new(3.0, 0.5, -2.0), Vec3::new(-1.2, 0.0, 0.3));
    emitter.set_placement(&mut host, placement).unwrap();

    let expected = placement.to_transform();
    for primitive in emitter.primitives().unwrap() {
        assert_eq!(host.primitive_transform(primitive), Some(&expected));
    }
    assert_eq!(emitter.placement(), placement);

    emitter.set_position(&mut host, Vec3::new(0.0, 1.0, 0.0)).unwrap();
    assert_eq!(emitter.placement().rotation, placement.rotation);
    emitter.set_rotation(&mut host, Vec3::zeros()).unwrap();
    assert_eq!(emitter.placement(), Placement::at(Vec3::new(0.0, 1.0, 0.0)));

    let [disc, ring_a, ring_b] = emitter.primitives().unwrap();
    assert_eq!(host.primitive_transform(disc), host.primitive_transform(ring_a));
    assert_eq!(host.primitive_transform(ring_a), host.primitive_transform(ring_b));
}

#[test]
fn test_construction_applies_initial_placement() {
    let (mut host, target) = host_with_target();
    let placement = Placement::at(Vec3::new(1.0, 2.0, 3.0));
    let emitter = PulseEmitter::new(&mut host, target, unit_rate_settings().with_placement(placement)).unwrap();

    for primitive in emitter.primitives().unwrap() {
        assert_eq!(host.primitive_transform(primitive), Some(&placement.to_transform()));
    }
}

#[test]
fn test_non_finite_placement_rejected() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    let err = emitter
        .set_position(&mut host, Vec3::new(f32::INFINITY, 0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, PulseError::InvalidConfiguration { field: "placement", .. }));
    assert_eq!(emitter.placement(), Placement::default());
}

#[test]
fn test_set_radius_rebuilds_disc_and_retargets_rings() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(2);
    let before = emitter.status().unwrap();

    emitter.set_radius(&mut host, 4.0).unwrap();

    let [disc, ..] = emitter.primitives().unwrap();
    assert_eq!(host.primitive_shape(disc).unwrap().bounding_radius(), 4.0);
    let status = emitter.status().unwrap();
    assert_eq!(status.disc_radius, 4.0);
    for (ring, old) in status.rings.iter().zip(before.rings.iter()) {
        assert_eq!(ring.target_radius(), 4.0);
        assert_eq!(ring.current_radius(), old.current_radius());
    }
    assert_eq!(host.stats().live_shapes, 3);

    // Ring two was at 7.0, beyond the new target, so it resets next frame
    host.run_frames(1);
    assert_eq!(emitter.status().unwrap().rings[1].current_radius(), RING_EPSILON_RADIUS);

    assert!(matches!(
        emitter.set_radius(&mut host, 0.0),
        Err(PulseError::InvalidConfiguration { field: "radius", .. })
    ));
    assert_eq!(emitter.settings().radius, 4.0);
}

#[test]
fn test_set_segments_applies_to_disc_now_and_rings_on_rebuild() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    let [disc, ring_a, _] = emitter.primitives().unwrap();

    emitter.set_segments(&mut host, 64).unwrap();
    assert_eq!(host.primitive_shape(disc).unwrap().shape().segments, 64);
    assert_eq!(host.primitive_shape(ring_a).unwrap().shape().segments, 32);

    emitter.begin(&mut host).unwrap();
    host.run_frames(1);
    assert_eq!(host.primitive_shape(ring_a).unwrap().shape().segments, 64);

    assert!(emitter.set_segments(&mut host, 2).is_err());
    assert_eq!(emitter.status().unwrap().disc_segments, 64);
}

#[test]
fn test_set_growth_rate_applies_next_frame() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(1);

    emitter.set_growth_rate(2.5).unwrap();
    host.run_frames(1);
    assert_relative_eq!(emitter.status().unwrap().rings[0].current_radius(), 3.51, epsilon = EPSILON);
    assert!(emitter.set_growth_rate(0.0).is_err());
}

#[test]
fn test_setters_reject_values_that_stall_the_rings() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();

    let err = emitter.set_radius(&mut host, 0.005).unwrap_err();
    assert!(matches!(err, PulseError::InvalidConfiguration { field: "radius", .. }));
    let err = emitter.set_radius(&mut host, 1e8).unwrap_err();
    assert!(matches!(err, PulseError::InvalidConfiguration { field: "growth_rate", .. }));
    assert_eq!(emitter.status().unwrap().disc_radius, 10.0);

    emitter.set_radius(&mut host, 1e6).unwrap();
    let err = emitter.set_growth_rate(1e-3).unwrap_err();
    assert!(matches!(err, PulseError::InvalidConfiguration { field: "growth_rate", .. }));
    assert_eq!(emitter.settings().growth_rate, 1.0);

    emitter.begin(&mut host).unwrap();
    let before = emitter.status().unwrap().rings[1].current_radius();
    host.run_frames(10);
    assert!(emitter.status().unwrap().rings[1].current_radius() > before);
}

#[test]
fn test_dispose_releases_everything_and_blocks_operations() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(3);

    emitter.dispose(&mut host).unwrap();
    assert!(emitter.is_disposed());
    assert!(!emitter.is_active());
    assert!(!emitter.is_scheduled());
    assert_eq!(host.pending_frames(), 0);

    let stats = host.stats();
    assert_eq!(stats.live_shapes, 0);
    assert_eq!(stats.live_materials, 0);
    assert_eq!(stats.live_primitives, 0);
    assert_eq!(stats.bytes_resident, 0);
    assert!(host.scene_primitives(target.scene).is_empty());

    let after_dispose = |result: PulseResult<()>| {
        matches!(result, Err(PulseError::OperationAfterDispose { .. }))
    };
    assert!(after_dispose(emitter.begin(&mut host)));
    assert!(after_dispose(emitter.stop(&mut host)));
    assert!(after_dispose(emitter.set_placement(&mut host, Placement::default())));
    assert_eq!(
        emitter.set_position(&mut host, Vec3::zeros()),
        Err(PulseError::OperationAfterDispose { operation: "set_position" })
    );
    assert_eq!(
        emitter.set_rotation(&mut host, Vec3::zeros()),
        Err(PulseError::OperationAfterDispose { operation: "set_rotation" })
    );
    assert!(after_dispose(emitter.set_radius(&mut host, 3.0)));
    assert!(after_dispose(emitter.set_segments(&mut host, 16)));
    assert!(after_dispose(emitter.set_growth_rate(0.5)));
    assert!(after_dispose(emitter.set_color(&mut host, Color::WHITE)));
    assert!(matches!(emitter.status(), Err(PulseError::OperationAfterDispose { operation: "status" })));
    assert!(emitter.primitives().is_err());
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_dispose_twice_does_not_double_release() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();

    emitter.dispose(&mut host).unwrap();
    let released = host.stats();
    emitter.dispose(&mut host).unwrap();
    assert_eq!(host.stats(), released);
    assert_eq!(released.shapes_released, 3);
}

#[test]
fn test_hook_never_fires_after_dispose() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(2);
    let rendered = host.stats().frames_rendered;

    emitter.stop(&mut host).unwrap();
    emitter.dispose(&mut host).unwrap();
    assert_eq!(host.run_frames(10), 0);
    assert_eq!(host.stats().frames_rendered, rendered);
}

#[test]
fn test_frame_fault_stops_rearming_and_can_be_restarted() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(2);

    // No room for the next ring shape
    host.set_memory_budget(host.stats().bytes_resident);
    host.run_frames(1);

    assert!(matches!(
        emitter.last_fault(),
        Some(PulseError::Host(HostError::MemoryBudgetExceeded { .. }))
    ));
    assert!(!emitter.is_active());
    assert!(!emitter.is_scheduled());
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.stats().live_shapes, 3);
    assert_eq!(emitter.status().unwrap().frames_advanced, 2);

    host.set_memory_budget(0);
    emitter.begin(&mut host).unwrap();
    assert!(emitter.last_fault().is_none());
    host.run_frames(1);
    assert_eq!(emitter.status().unwrap().frames_advanced, 3);
}

#[test]
fn test_render_fault_stops_hook_while_inactive() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    emitter.stop(&mut host).unwrap();

    host.set_render_fault(Some("surface lost".into()));
    host.run_frames(1);

    assert_eq!(
        emitter.last_fault(),
        Some(PulseError::Host(HostError::RenderFailed("surface lost".into())))
    );
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_render_draws_all_three_primitives() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    host.run_frames(1);

    let draw = host.last_draw();
    assert_eq!(draw.len(), 3);
    assert_eq!(draw[0].opacity, DISC_OPACITY);
    assert_relative_eq!(draw[1].radius, 1.01, epsilon = EPSILON);
    assert_relative_eq!(draw[2].radius, 6.0, epsilon = EPSILON);
}

#[test]
fn test_emitters_are_independent() {
    let (mut host, target) = host_with_target();
    let mut a = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    let mut b = PulseEmitter::new(&mut host, target, unit_rate_settings().with_growth_rate(0.5)).unwrap();
    a.begin(&mut host).unwrap();
    b.begin(&mut host).unwrap();
    host.run_frames(2);

    a.dispose(&mut host).unwrap();
    host.run_frames(2);

    assert_eq!(host.scene_primitives(target.scene).len(), 3);
    assert_eq!(b.status().unwrap().frames_advanced, 4);
    assert_relative_eq!(b.status().unwrap().rings[0].current_radius(), 2.01, epsilon = EPSILON);
    b.dispose(&mut host).unwrap();
    assert_eq!(host.stats().live_shapes, 0);
}

#[test]
fn test_dropped_emitter_stops_rearming() {
    let (mut host, target) = host_with_target();
    let mut emitter = PulseEmitter::new(&mut host, target, unit_rate_settings()).unwrap();
    emitter.begin(&mut host).unwrap();
    drop(emitter);

    assert_eq!(host.run_frames(1), 1);
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.stats().frames_rendered, 0);
}
