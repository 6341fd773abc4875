// Effect layers and the section binder.

use audiofield_core::constants::{
    BLOOM_RADIUS, BLOOM_STRENGTH, BLOOM_THRESHOLD, CLOUD_BASE_SCALE, DRIP_SPAWN_Y,
};
use audiofield_core::layers::{DripColor, DripParticle, DripsLayer, HalftoneLayer, WaveLayer};
use audiofield_core::{AudioLevel, EffectLayer, LayerKind, LayerStack, SectionBinder, SectionId};
use glam::Vec3;
use rand::prelude::*;

fn stack() -> LayerStack {
    LayerStack::new(2000, 100, 1)
}

#[test]
fn initial_visibility() {
    let layers = stack();
    assert!(layers.cloud.is_visible());
    assert!(!layers.wave.is_visible());
    assert!(!layers.halftone.is_visible());
    assert!(layers.drips.is_visible());
    assert!(layers.post.is_visible());
}

#[test]
fn cloud_breathes_with_level() {
    let mut layers = stack();
    layers.cloud.update(2.0, AudioLevel::new(0.5));
    let expected = CLOUD_BASE_SCALE + Vec3::splat(0.1);
    assert!((layers.cloud.scale - expected).length() < 1e-6);
    assert!((layers.cloud.rotation_y - 0.4).abs() < 1e-6);
}

#[test]
fn wave_heights_only_update_while_visible() {
    let mut wave = WaveLayer::new();
    assert_eq!(wave.vertices().len(), 129 * 129);
    assert_eq!(wave.indices().len(), 128 * 128 * 6);

    wave.update(1.3, AudioLevel::new(1.0));
    assert!(wave.vertices().iter().all(|v| v.position.z == 0.0));
    assert!((wave.amplitude - 0.6).abs() < 1e-6);
    assert!((wave.frequency - 2.5).abs() < 1e-6);

    wave.set_visible(true);
    wave.update(1.3, AudioLevel::new(1.0));
    let v = wave.vertices()[200];
    let (amp, freq) = (wave.amplitude, wave.frequency);
    let expected = amp * (v.position.x * freq + 1.3).sin() * (v.position.y * freq + 1.3).sin();
    assert!((v.position.z - expected).abs() < 1e-6);
    assert!(wave.vertices().iter().any(|v| v.position.z != 0.0));
    assert!(wave.vertices().iter().all(|v| v.color[3] == 0.7));
}

#[test]
fn hidden_layers_are_not_advanced() {
    let mut layers = LayerStack::new(16, 1, 1);
    assert!(!layers.halftone.is_visible());
    let sizes: Vec<f32> = layers.halftone.dots().iter().map(|d| d.size).collect();

    layers.update_all(1.7, AudioLevel::new(0.5));
    assert_eq!(layers.halftone.rotation_z, 0.0);
    assert_eq!(layers.halftone.uniforms.elapsed, 0.0);
    let after: Vec<f32> = layers.halftone.dots().iter().map(|d| d.size).collect();
    assert_eq!(after, sizes);
    assert_eq!(layers.wave.amplitude, 0.1);

    // visible layers did advance
    assert!((layers.cloud.rotation_y - 1.7 * 0.2).abs() < 1e-6);
    assert_eq!(layers.post.noise.seed, 1.7);

    layers.halftone.set_visible(true);
    layers.update_all(1.7, AudioLevel::new(0.5));
    assert!((layers.halftone.rotation_z - 0.17).abs() < 1e-6);
}

#[test]
fn halftone_grid_and_pulse() {
    let mut halftone = HalftoneLayer::new(2000);
    assert_eq!(halftone.dots().len(), 2000);
    let first = halftone.dots()[0].position;
    assert_eq!(first, Vec3::new(-2.0, -2.0, -5.0));
    assert!(halftone.dots().iter().all(|d| d.position.z == -5.0));

    halftone.update(1.0, AudioLevel::new(0.0));
    assert!((halftone.rotation_z - 0.1).abs() < 1e-6);
    let d = halftone.dots()[0].position.truncate().length();
    let expected = 0.05 * ((d * 2.0 - 1.0).sin() * 0.5 + 0.5);
    assert!((halftone.dots()[0].size - expected).abs() < 1e-6);

    halftone.update(1.0, AudioLevel::new(1.0));
    assert!((halftone.dots()[0].size - expected * 3.0).abs() < 1e-6);
}

#[test]
fn drip_resets_after_ceil_distance_over_speed_updates() {
    for (speed, distance) in [(0.5_f32, 3.0_f32), (0.7, 3.0), (0.02, 5.5), (0.013, 7.1)] {
        let drip = DripParticle::new(Vec3::new(0.0, DRIP_SPAWN_Y, -2.0), speed, distance, DripColor::Red);
        let mut layer = DripsLayer::from_particles(vec![drip], StdRng::seed_from_u64(0));
        let steps = (distance as f64 / speed as f64).ceil() as usize;
        for i in 1..steps {
            layer.update(0.0, AudioLevel::SILENT);
            let y = layer.drips()[0].position.y;
            assert!(y < DRIP_SPAWN_Y, "step {i}: reset too early");
        }
        layer.update(0.0, AudioLevel::SILENT);
        let drip = &layer.drips()[0];
        assert_eq!(drip.position.y, DRIP_SPAWN_Y);
        assert_eq!(drip.scale_y, 1.0);
    }
}

#[test]
fn drips_fall_faster_and_stretch_with_level() {
    let make = || {
        DripsLayer::from_particles(
            vec![DripParticle::new(Vec3::new(0.0, 3.0, 0.0), 0.01, 5.0, DripColor::Teal)],
            StdRng::seed_from_u64(0),
        )
    };
    let mut quiet = make();
    let mut loud = make();
    quiet.update(0.0, AudioLevel::SILENT);
    loud.update(0.0, AudioLevel::new(1.0));
    assert!((quiet.drips()[0].position.y - 2.99).abs() < 1e-5);
    assert!((loud.drips()[0].position.y - 2.97).abs() < 1e-5);
    // 1 + 0.03 * 0.1 * 2
    assert!((loud.drips()[0].scale_y - 1.006).abs() < 1e-5);
}

#[test]
fn drip_pool_is_randomized_within_bounds() {
    let layers = stack();
    assert_eq!(layers.drips.drips().len(), 100);
    for d in layers.drips.drips() {
        assert!((0.01..0.03).contains(&d.speed));
        assert!((3.0..8.0).contains(&d.max_distance));
        assert!((0.05..0.15).contains(&d.radius));
        assert!((-3.0..=3.0).contains(&d.position.x));
        assert!((-5.0..=1.0).contains(&d.position.z));
        assert_eq!(d.position.y, 3.0);
    }
}

#[test]
fn post_noise_follows_level_and_bloom_is_static() {
    let mut layers = stack();
    layers.post.update(4.5, AudioLevel::new(0.5));
    assert!((layers.post.noise.amount - 0.08).abs() < 1e-6);
    assert_eq!(layers.post.noise.seed, 4.5);
    assert_eq!(layers.post.bloom.strength, BLOOM_STRENGTH);
    assert_eq!(layers.post.bloom.radius, BLOOM_RADIUS);
    assert_eq!(layers.post.bloom.threshold, BLOOM_THRESHOLD);
}

#[test]
fn section_table_drives_visibility() {
    let mut layers = stack();
    let mut binder = SectionBinder::new();
    let cases = [
        ("about", LayerKind::Cloud),
        ("skills", LayerKind::Halftone),
        ("experience", LayerKind::Wave),
        ("education", LayerKind::Cloud),
        ("projects", LayerKind::Halftone),
        ("contact", LayerKind::Wave),
        ("blog", LayerKind::Cloud),
    ];
    for (id, shown) in cases {
        assert!(binder.apply(SectionId::from(id), &mut layers));
        for kind in LayerKind::SECTION_BOUND {
            assert_eq!(layers.get(kind).is_visible(), kind == shown, "{id}: {kind:?}");
        }
    }
}

#[test]
fn about_to_skills_leaves_drips_and_post_alone() {
    let mut layers = stack();
    layers.drips.set_visible(false);
    let mut binder = SectionBinder::new();
    binder.apply("about".into(), &mut layers);
    binder.apply("skills".into(), &mut layers);
    assert!(!layers.cloud.is_visible());
    assert!(layers.halftone.is_visible());
    assert!(!layers.drips.is_visible());
    assert!(layers.post.is_visible());
}

#[test]
fn sections_can_show_several_layers_or_none() {
    const TABLE: &[(&str, &[LayerKind])] = &[
        ("hero", &[LayerKind::Cloud, LayerKind::Wave]),
        ("footer", &[]),
        // drips are not section-bound, so listing them has no effect
        ("gallery", &[LayerKind::Halftone, LayerKind::Drips]),
    ];
    let mut layers = stack();
    let mut binder = SectionBinder::with_table(TABLE);

    binder.apply("hero".into(), &mut layers);
    assert!(layers.cloud.is_visible());
    assert!(layers.wave.is_visible());
    assert!(!layers.halftone.is_visible());

    binder.apply("footer".into(), &mut layers);
    for kind in LayerKind::SECTION_BOUND {
        assert!(!layers.get(kind).is_visible(), "{kind:?}");
    }
    assert!(layers.drips.is_visible());
    assert!(layers.post.is_visible());

    layers.drips.set_visible(false);
    binder.apply("gallery".into(), &mut layers);
    assert!(layers.halftone.is_visible());
    assert!(!layers.drips.is_visible());

    // unknown ids fall back to the cloud
    binder.apply("elsewhere".into(), &mut layers);
    assert!(layers.cloud.is_visible());
    assert!(!layers.halftone.is_visible());
}

#[test]
fn repeated_section_is_a_no_op() {
    let mut layers = stack();
    let mut binder = SectionBinder::new();
    assert!(binder.apply("skills".into(), &mut layers));
    layers.cloud.set_visible(true);
    assert!(!binder.apply("skills".into(), &mut layers));
    assert!(layers.cloud.is_visible());
    assert_eq!(binder.current().map(|s| s.as_str()), Some("skills"));
}
