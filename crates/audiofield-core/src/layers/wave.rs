use glam::{Mat4, Vec3};

use super::{EffectLayer, LayerKind, LayerUniforms};
use crate::color::mix_rgb;
use crate::constants::{
    RED, TEAL, WAVE_ALPHA, WAVE_AMPLITUDE_BASE, WAVE_AMPLITUDE_LEVEL, WAVE_FREQUENCY_BASE,
    WAVE_FREQUENCY_LEVEL, WAVE_PLANE_SIZE, WAVE_PLANE_Y, WAVE_SEGMENTS,
};
use crate::snapshot::AudioLevel;

/// Plane-local vertex; `position.z` is the displaced height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveVertex {
    pub position: Vec3,
    pub color: [f32; 4],
}

#[derive(Clone, Debug)]
pub struct WaveLayer {
    visible: bool,
    pub uniforms: LayerUniforms,
    pub amplitude: f32,
    pub frequency: f32,
    vertices: Vec<WaveVertex>,
    indices: Vec<u32>,
}

impl Default for WaveLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveLayer {
    pub fn new() -> Self {
        let side = WAVE_SEGMENTS + 1;
        let half = WAVE_PLANE_SIZE * 0.5;
        let step = WAVE_PLANE_SIZE / WAVE_SEGMENTS as f32;
        let mut vertices = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                let x = -half + col as f32 * step;
                let y = half - row as f32 * step;
                vertices.push(WaveVertex {
                    position: Vec3::new(x, y, 0.0),
                    color: color_for_height(0.0),
                });
            }
        }
        let mut indices = Vec::with_capacity(WAVE_SEGMENTS * WAVE_SEGMENTS * 6);
        for row in 0..WAVE_SEGMENTS {
            for col in 0..WAVE_SEGMENTS {
                let a = (row * side + col) as u32;
                let b = a + side as u32;
                indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
            }
        }
        Self {
            visible: false,
            uniforms: LayerUniforms::default(),
            amplitude: WAVE_AMPLITUDE_BASE,
            frequency: WAVE_FREQUENCY_BASE,
            vertices,
            indices,
        }
    }

    pub fn vertices(&self) -> &[WaveVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Plane lies flat (rotated -90 deg about X) below the scene.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, WAVE_PLANE_Y, 0.0))
            * Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2)
    }
}

/// Teal in the troughs, red on the crests.
pub(crate) fn color_for_height(z: f32) -> [f32; 4] {
    let t = ((z + 0.1) * 5.0).clamp(0.0, 1.0);
    let [r, g, b] = mix_rgb(TEAL, RED, t);
    [r, g, b, WAVE_ALPHA]
}

impl EffectLayer for WaveLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Wave
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
        self.amplitude = WAVE_AMPLITUDE_BASE + WAVE_AMPLITUDE_LEVEL * l;
        self.frequency = WAVE_FREQUENCY_BASE + WAVE_FREQUENCY_LEVEL * l;
        if !self.visible {
            return;
        }
        let (amp, freq) = (self.amplitude, self.frequency);
        for v in self.vertices.iter_mut() {
            let z = amp * (v.position.x * freq + elapsed).sin() * (v.position.y * freq + elapsed).sin();
            v.position.z = z;
            v.color = color_for_height(z);
        }
    }
}
