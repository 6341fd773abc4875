use glam::{Mat4, Quat, Vec3};

use super::{EffectLayer, LayerKind, LayerUniforms};
use crate::constants::{
    CLOUD_BASE_SCALE, CLOUD_CENTER, CLOUD_LEVEL_SCALE, CLOUD_RADIUS, CLOUD_SPIN, CLOUD_WHITE,
    EYE_BLACK, EYE_OFFSETS, EYE_RADIUS,
};
use crate::snapshot::AudioLevel;

/// Soft white blob with two eyes that breathes with the level.
#[derive(Clone, Debug)]
pub struct CloudLayer {
    visible: bool,
    pub uniforms: LayerUniforms,
    pub scale: Vec3,
    pub rotation_y: f32,
}

impl Default for CloudLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudLayer {
    pub fn new() -> Self {
        Self {
            visible: true,
            uniforms: LayerUniforms::default(),
            scale: CLOUD_BASE_SCALE,
            rotation_y: 0.0,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_y(self.rotation_y),
            CLOUD_CENTER,
        )
    }

    pub fn radius(&self) -> f32 {
        CLOUD_RADIUS
    }

    pub fn color(&self) -> [f32; 3] {
        CLOUD_WHITE
    }

    /// World-space eye centers and radius, following the body transform.
    pub fn eyes(&self) -> [(Vec3, f32, [f32; 3]); 2] {
        let m = self.model_matrix();
        EYE_OFFSETS.map(|o| (m.transform_point3(Vec3::from(o)), EYE_RADIUS, EYE_BLACK))
    }
}

impl EffectLayer for CloudLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Cloud
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
        self.scale = CLOUD_BASE_SCALE + Vec3::splat(CLOUD_LEVEL_SCALE * l);
        self.rotation_y = elapsed * CLOUD_SPIN;
    }
}
