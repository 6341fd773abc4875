// Particle field: seeded layout, radial-only displacement, idle pulse, spin.

use audiofield_core::constants::{FIELD_SPIN_X, FIELD_SPIN_Y};
use audiofield_core::{ParticleField, SampleSnapshot};

fn flat(level: f32, bins: usize) -> SampleSnapshot {
    SampleSnapshot::new(vec![0.0], vec![level; bins]).unwrap()
}

#[test]
fn points_lie_on_the_shell() {
    let field = ParticleField::new(5000, 7);
    assert_eq!(field.len(), 5000);
    for p in field.points() {
        let r = p.original().length();
        assert!((0.999..=1.501).contains(&r), "radius {r}");
    }
}

#[test]
fn same_seed_same_layout() {
    let a = ParticleField::new(64, 42);
    let b = ParticleField::new(64, 42);
    for (pa, pb) in a.points().iter().zip(b.points()) {
        assert_eq!(pa.original(), pb.original());
        assert_eq!(pa.base_color(), pb.base_color());
    }
}

#[test]
fn displacement_is_radial_when_live() {
    let mut field = ParticleField::new(500, 3);
    field.update(Some(&flat(0.8, 1024)), 1.0, 1.0);
    for p in field.points() {
        let o = p.original();
        let cross = o.cross(p.current).length();
        assert!(cross < 1e-4, "non-radial displacement {cross}");
        // 1 + 0.2 * 0.8 * 0.5
        let ratio = p.current.length() / o.length();
        assert!((ratio - 1.08).abs() < 1e-4);
    }
}

#[test]
fn displacement_is_radial_during_blend() {
    let mut field = ParticleField::new(200, 11);
    field.update(Some(&flat(1.0, 64)), 2.3, 0.4);
    for p in field.points() {
        assert!(p.original().cross(p.current).length() < 1e-4);
    }
}

#[test]
fn idle_pulse_follows_time_and_index() {
    let mut field = ParticleField::new(10, 5);
    let t = 0.9_f32;
    field.update(None, t, 0.0);
    for (i, p) in field.points().iter().enumerate() {
        let expected = 1.0 + 0.1 * (t + 0.1 * i as f32).sin();
        let ratio = p.current.length() / p.original().length();
        assert!((ratio - expected).abs() < 1e-4);
        assert_eq!(p.color, p.base_color());
    }
}

#[test]
fn live_color_brightens_with_magnitude() {
    let mut quiet = ParticleField::new(4, 9);
    let mut loud = ParticleField::new(4, 9);
    quiet.update(Some(&flat(0.0, 8)), 0.0, 1.0);
    loud.update(Some(&flat(1.0, 8)), 0.0, 1.0);
    let sum = |c: [f32; 3]| c[0] + c[1] + c[2];
    assert!(sum(loud.points()[0].color) > sum(quiet.points()[0].color));
}

#[test]
fn rotation_advances_per_frame() {
    let mut field = ParticleField::new(1, 1);
    for _ in 0..10 {
        field.update(None, 0.0, 0.0);
    }
    let r = field.rotation();
    assert!((r.y - 10.0 * FIELD_SPIN_Y).abs() < 1e-6);
    assert!((r.x - 10.0 * FIELD_SPIN_X).abs() < 1e-6);
    assert_eq!(r.z, 0.0);
}

#[test]
fn ramp_back_to_idle_keeps_the_last_live_bins() {
    let mut field = ParticleField::new(8, 4);
    field.update(Some(&flat(0.9, 1024)), 1.0, 1.0);
    let live_radii: Vec<f32> = field.points().iter().map(|p| p.current.length()).collect();

    // first idle frame with the mix still high: radii barely move
    field.update(None, 1.0 + 1.0 / 60.0, 0.95);
    for (p, before) in field.points().iter().zip(&live_radii) {
        let o = p.original().length();
        let jump = (p.current.length() - before).abs() / o;
        assert!(jump < 0.02, "radius jumped by {jump}");
    }

    // a fresh field with no live history falls back to silent bins
    let mut fresh = ParticleField::new(8, 4);
    fresh.update(None, 0.0, 1.0);
    for p in fresh.points() {
        assert!((p.current.length() / p.original().length() - 1.0).abs() < 1e-5);
    }
}
