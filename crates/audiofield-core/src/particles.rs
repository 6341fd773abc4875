//! Spherical shell of points displaced radially by the spectrum.

use glam::{EulerRot, Mat4, Vec3};
use rand::prelude::*;

use crate::color::{hsl_to_rgb, mix_rgb};
use crate::constants::{
    FIELD_SPIN_X, FIELD_SPIN_Y, IDLE_PULSE_DEPTH, IDLE_PULSE_PHASE_STEP, PARTICLE_DISPLACEMENT,
    PARTICLE_RADIAL_GAIN, SHELL_RADIUS_MIN, SHELL_RADIUS_SPAN,
};
use crate::snapshot::SampleSnapshot;

#[derive(Clone, Debug)]
pub struct ParticlePoint {
    original: Vec3,
    base_color: [f32; 3],
    pub current: Vec3,
    pub color: [f32; 3],
}

impl ParticlePoint {
    pub fn original(&self) -> Vec3 {
        self.original
    }

    pub fn base_color(&self) -> [f32; 3] {
        self.base_color
    }
}

pub struct ParticleField {
    points: Vec<ParticlePoint>,
    rotation: Vec3,
    // Last live magnitudes; the ramp back to idle keeps reading these.
    live_bins: Vec<f32>,
}

impl ParticleField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..count)
            .map(|_| {
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
                let radius = SHELL_RADIUS_MIN + rng.gen::<f32>() * SHELL_RADIUS_SPAN;
                let original = Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                );
                let base_color = hsl_to_rgb(0.5 + rng.gen::<f32>() * 0.2, 0.7, 0.5);
                ParticlePoint {
                    original,
                    base_color,
                    current: original,
                    color: base_color,
                }
            })
            .collect();
        Self {
            points,
            rotation: Vec3::ZERO,
            live_bins: Vec::new(),
        }
    }

    pub fn points(&self) -> &[ParticlePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Euler angles (x, y, z) in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// One frame of motion. `live` is the source snapshot when playing.
    /// `live_mix` of 1 is fully spectrum-driven, 0 is the idle pulse; anything
    /// between blends the radial factor and color.
    pub fn update(&mut self, live: Option<&SampleSnapshot>, elapsed: f32, live_mix: f32) {
        let mix = if live_mix.is_finite() {
            live_mix.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if let Some(snapshot) = live {
            self.live_bins.clear();
            self.live_bins.extend_from_slice(snapshot.frequency_domain());
        }
        let bins = &self.live_bins;
        for (i, p) in self.points.iter_mut().enumerate() {
            let v = if bins.is_empty() {
                0.0
            } else {
                bins[i % bins.len()]
            };
            let live_factor = 1.0 + PARTICLE_RADIAL_GAIN * v * PARTICLE_DISPLACEMENT;
            let idle_factor =
                1.0 + IDLE_PULSE_DEPTH * (elapsed + IDLE_PULSE_PHASE_STEP * i as f32).sin();
            let factor = idle_factor + (live_factor - idle_factor) * mix;

            // Stationary when the original sits at the origin.
            p.current = if p.original.length_squared() > 0.0 {
                p.original * factor
            } else {
                p.original
            };

            let live_color = hsl_to_rgb(0.5 + 0.2 * v, 0.7, 0.5 + 0.5 * v);
            p.color = mix_rgb(p.base_color, live_color, mix);
        }
        self.rotation.y += FIELD_SPIN_Y;
        self.rotation.x += FIELD_SPIN_X;
        log::trace!("[particles] rotation {:?}", self.rotation);
    }
}
