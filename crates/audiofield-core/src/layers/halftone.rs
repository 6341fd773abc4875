use glam::{Mat4, Vec3};

use super::{EffectLayer, LayerKind, LayerUniforms};
use crate::constants::{
    HALFTONE_DOT_SIZE, HALFTONE_EXTENT, HALFTONE_LEVEL_GAIN, HALFTONE_SPIN, HALFTONE_Z, TEAL,
};
use crate::snapshot::AudioLevel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalftoneDot {
    pub position: Vec3,
    pub size: f32,
}

/// Grid of dots pulsing outward in rings from the center.
#[derive(Clone, Debug)]
pub struct HalftoneLayer {
    visible: bool,
    pub uniforms: LayerUniforms,
    pub rotation_z: f32,
    dots: Vec<HalftoneDot>,
}

impl HalftoneLayer {
    pub fn new(count: usize) -> Self {
        // Fractional grid width, so rows wrap mid-line.
        let grid = (count as f32).sqrt().max(1.0);
        let spacing = HALFTONE_EXTENT / grid;
        let half = HALFTONE_EXTENT * 0.5;
        let dots = (0..count)
            .map(|i| {
                let x = (i as f32 % grid) * spacing - half;
                let y = (i as f32 / grid).floor() * spacing - half;
                HalftoneDot {
                    position: Vec3::new(x, y, HALFTONE_Z),
                    size: HALFTONE_DOT_SIZE,
                }
            })
            .collect();
        Self {
            visible: false,
            uniforms: LayerUniforms::default(),
            rotation_z: 0.0,
            dots,
        }
    }

    pub fn dots(&self) -> &[HalftoneDot] {
        &self.dots
    }

    pub fn color(&self) -> [f32; 3] {
        TEAL
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.rotation_z)
    }
}

/// Dot size at distance `d` from the grid center.
pub(crate) fn dot_size(d: f32, elapsed: f32, level: f32) -> f32 {
    let pulse = (d * 2.0 - elapsed).sin() * 0.5 + 0.5;
    HALFTONE_DOT_SIZE * pulse * (1.0 + HALFTONE_LEVEL_GAIN * level)
}

impl EffectLayer for HalftoneLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Halftone
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn update(&mut self, elapsed: f32, level: AudioLevel) {
        let l = level.get();
        self.uniforms = LayerUniforms {
            elapsed,
            audio_level: l,
        };
        self.rotation_z = elapsed * HALFTONE_SPIN;
        for dot in self.dots.iter_mut() {
            let d = dot.position.truncate().length();
            dot.size = dot_size(d, elapsed, l);
        }
    }
}
