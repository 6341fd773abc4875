use glam::{Mat4, Vec3};
use rand::prelude::*;

use super::{EffectLayer, LayerKind, LayerUniforms};
use crate::constants::{
    BLUE, DRIP_ALPHA, DRIP_LEVEL_SPEEDUP, DRIP_SPAWN_Y, DRIP_SPREAD, DRIP_STRETCH, DRIP_Z_OFFSET,
    RED, TEAL, YELLOW,
};
use crate::snapshot::AudioLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DripColor {
    Teal,
    Red,
    Yellow,
    Blue,
}

impl DripColor {
    pub fn rgba(self) -> [f32; 4] {
        let [r, g, b] = match self {
            DripColor::Teal => TEAL,
            DripColor::Red => RED,
            DripColor::Yellow => YELLOW,
            DripColor::Blue => BLUE,
        };
        [r, g, b, DRIP_ALPHA]
    }

    fn from_index(i: u32) -> Self {
        match i % 4 {
            0 => DripColor::Teal,
            1 => DripColor::Red,
            2 => DripColor::Yellow,
            _ => DripColor::Blue,
        }
    }
}

/// A cylinder hanging from `position` that falls and stretches.
#[derive(Clone, Debug)]
pub struct DripParticle {
    pub position: Vec3,
    pub speed: f32,
    pub original_y: f32,
    pub max_distance: f32,
    pub color: DripColor,
    pub radius: f32,
    pub length: f32,
    pub scale_y: f32,
    // f64 so the reset lands on exactly ceil(d / s) steps.
    travelled: f64,
}

impl DripParticle {
    pub fn new(position: Vec3, speed: f32, max_distance: f32, color: DripColor) -> Self {
        Self {
            position,
            speed: speed.max(f32::EPSILON),
            original_y: position.y,
            max_distance: max_distance.max(f32::EPSILON),
            color,
            radius: 0.1,
            length: 0.45,
            scale_y: 1.0,
            travelled: 0.0,
        }
    }

    fn spawn(rng: &mut StdRng) -> Self {
        let x = (rng.gen::<f32>() - 0.5) * DRIP_SPREAD;
        let z = (rng.gen::<f32>() - 0.5) * DRIP_SPREAD + DRIP_Z_OFFSET;
        let radius = rng.gen::<f32>() * 0.1 + 0.05;
        let speed = rng.gen::<f32>() * 0.02 + 0.01;
        let length = rng.gen::<f32>() * 0.5 + 0.2;
        let color = DripColor::from_index(rng.gen_range(0..4));
        let max_distance = rng.gen::<f32>() * 5.0 + 3.0;
        Self {
            radius,
            length,
            ..Self::new(Vec3::new(x, DRIP_SPAWN_Y, z), speed, max_distance, color)
        }
    }

    /// Advances one frame; returns true when the drip went back to the top.
    fn step(&mut self, level: f32) -> bool {
        self.travelled += (self.speed * (1.0 + DRIP_LEVEL_SPEEDUP * level)) as f64;
        self.position.y = self.original_y - self.travelled as f32;
        self.scale_y = 1.0 + (self.original_y - self.position.y) * DRIP_STRETCH * (1.0 + level);
        let limit = self.max_distance as f64;
        if self.travelled >= limit - limit * 1e-9 {
            self.travelled = 0.0;
            self.position.y = self.original_y;
            self.scale_y = 1.0;
            return true;
        }
        false
    }

    /// The cylinder's top sits at `position` and it hangs downward.
    pub fn model_matrix(&self) -> Mat4 {
        let len = self.length * self.scale_y;
        Mat4::from_translation(self.position - Vec3::new(0.0, len * 0.5, 0.0))
            * Mat4::from_scale(Vec3::new(self.radius, len, self.radius))
    }
}

pub struct DripsLayer {
    visible: bool,
    pub uniforms: LayerUniforms,
    drips: Vec<DripParticle>,
    rng: StdRng,
}

impl DripsLayer {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed ^ 0xD419_D419);
        let drips = (0..count).map(|_| DripParticle::spawn(&mut rng)).collect();
        Self::from_particles(drips, rng)
    }

    /// Builds a pool from explicit particles; `rng` drives respawn positions.
    pub fn from_particles(drips: Vec<DripParticle>, rng: StdRng) -> Self {
        Self {
            visible: true,
            uniforms: LayerUniforms::default(),
            drips,
            rng,
        }
    }

    pub fn drips(&self) -> &[DripParticle] {
        &self.drips
    }
}

impl EffectLayer for DripsLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Drips
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
        for drip in self.drips.iter_mut() {
            if drip.step(l) {
                drip.position.x = (self.rng.gen::<f32>() - 0.5) * DRIP_SPREAD;
                drip.position.z = (self.rng.gen::<f32>() - 0.5) * DRIP_SPREAD + DRIP_Z_OFFSET;
            }
        }
    }
}
