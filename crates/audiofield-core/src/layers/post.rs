use super::{EffectLayer, LayerKind, LayerUniforms};
use crate::constants::{BLOOM_RADIUS, BLOOM_STRENGTH, BLOOM_THRESHOLD, NOISE_BASE, NOISE_LEVEL_GAIN};
use crate::snapshot::AudioLevel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomParams {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            strength: BLOOM_STRENGTH,
            radius: BLOOM_RADIUS,
            threshold: BLOOM_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoiseParams {
    pub amount: f32,
    pub seed: f32,
}

/// Screen-space bloom and film noise applied over the composed scene.
#[derive(Clone, Debug)]
pub struct PostLayer {
    visible: bool,
    pub uniforms: LayerUniforms,
    pub bloom: BloomParams,
    pub noise: NoiseParams,
}

impl Default for PostLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PostLayer {
    pub fn new() -> Self {
        Self {
            visible: true,
            uniforms: LayerUniforms::default(),
            bloom: BloomParams::default(),
            noise: NoiseParams {
                amount: NOISE_BASE,
                seed: 0.0,
            },
        }
    }
}

impl EffectLayer for PostLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Post
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
        self.noise = NoiseParams {
            amount: NOISE_BASE + NOISE_LEVEL_GAIN * l,
            seed: elapsed,
        };
    }
}
