// Camera orbit: damping, clamping and the drag-to-angle mapping.

use std::f32::consts::{FRAC_PI_2, TAU};

use audiofield_core::constants::{CAMERA_Z, ORBIT_DAMPING};
use audiofield_core::{Camera, Orbit, Viewport};
use glam::Vec3;

#[test]
fn default_eye_sits_on_the_z_axis() {
    let mut camera = Camera::for_viewport(Viewport::new(800, 600));
    camera.update_orbit();
    assert!((camera.eye - Vec3::new(0.0, 0.0, CAMERA_Z)).length() < 1e-6);
}

#[test]
fn damping_eases_toward_the_full_drag() {
    let mut orbit = Orbit::new(5.0);
    // a quarter of the surface height is a quarter turn
    orbit.drag(150.0, 0.0, 600.0);
    let target = -TAU * 0.25;

    orbit.step();
    assert!((orbit.yaw - target * ORBIT_DAMPING).abs() < 1e-6);

    let mut last_gap = (target - orbit.yaw).abs();
    for _ in 0..400 {
        orbit.step();
        let gap = (target - orbit.yaw).abs();
        assert!(gap <= last_gap, "overshoot or reversal");
        last_gap = gap;
    }
    assert!(last_gap < 1e-4, "still {last_gap} away");
    assert!(orbit.is_settled());
    assert_eq!(orbit.pitch, 0.0);
}

#[test]
fn pitch_never_reaches_the_poles() {
    let mut orbit = Orbit::new(5.0);
    orbit.drag(0.0, 10_000.0, 100.0);
    for _ in 0..500 {
        orbit.step();
    }
    assert!(orbit.pitch < FRAC_PI_2);
    assert!(orbit.pitch > 1.5);

    orbit.drag(0.0, -50_000.0, 100.0);
    for _ in 0..500 {
        orbit.step();
    }
    assert!(orbit.pitch > -FRAC_PI_2 && orbit.pitch < -1.5);
}

#[test]
fn orbit_keeps_distance_and_never_zooms() {
    let mut camera = Camera::for_viewport(Viewport::new(800, 600));
    camera.orbit.drag(123.0, -45.0, 600.0);
    for _ in 0..60 {
        camera.update_orbit();
        assert!(((camera.eye - camera.target).length() - CAMERA_Z).abs() < 1e-4);
    }
    assert!(camera.eye.x < 0.0, "dragging right swings the eye left");
    assert!(camera.eye.y < 0.0, "dragging up lowers the eye");
}

#[test]
fn non_finite_drags_are_ignored() {
    let mut orbit = Orbit::new(5.0);
    orbit.drag(f32::NAN, 3.0, 600.0);
    orbit.drag(1.0, f32::INFINITY, 600.0);
    assert!(orbit.is_settled());
}
