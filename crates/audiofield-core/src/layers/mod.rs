//! Animated scene layers. Each layer owns its own state and reacts to the
//! shared audio level; visibility is driven by the section binder.

mod cloud;
mod drips;
mod halftone;
mod post;
mod wave;

pub use cloud::CloudLayer;
pub use drips::{DripColor, DripParticle, DripsLayer};
pub use halftone::{HalftoneDot, HalftoneLayer};
pub use post::{BloomParams, NoiseParams, PostLayer};
pub use wave::{WaveLayer, WaveVertex};

use crate::snapshot::AudioLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Cloud,
    Wave,
    Halftone,
    Drips,
    Post,
}

impl LayerKind {
    pub const ALL: [LayerKind; 5] = [
        LayerKind::Cloud,
        LayerKind::Wave,
        LayerKind::Halftone,
        LayerKind::Drips,
        LayerKind::Post,
    ];

    /// Layers whose visibility follows the active section.
    pub const SECTION_BOUND: [LayerKind; 3] =
        [LayerKind::Cloud, LayerKind::Wave, LayerKind::Halftone];
}

/// Uniform inputs every layer receives each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerUniforms {
    pub elapsed: f32,
    pub audio_level: f32,
}

pub trait EffectLayer {
    fn kind(&self) -> LayerKind;
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;
    fn update(&mut self, elapsed: f32, level: AudioLevel);
}

/// The closed set of layers, in draw order.
pub struct LayerStack {
    pub cloud: CloudLayer,
    pub wave: WaveLayer,
    pub halftone: HalftoneLayer,
    pub drips: DripsLayer,
    pub post: PostLayer,
}

impl LayerStack {
    pub fn new(halftone_count: usize, drip_count: usize, seed: u64) -> Self {
        Self {
            cloud: CloudLayer::new(),
            wave: WaveLayer::new(),
            halftone: HalftoneLayer::new(halftone_count),
            drips: DripsLayer::new(drip_count, seed),
            post: PostLayer::new(),
        }
    }

    pub fn get(&self, kind: LayerKind) -> &dyn EffectLayer {
        match kind {
            LayerKind::Cloud => &self.cloud,
            LayerKind::Wave => &self.wave,
            LayerKind::Halftone => &self.halftone,
            LayerKind::Drips => &self.drips,
            LayerKind::Post => &self.post,
        }
    }

    pub fn get_mut(&mut self, kind: LayerKind) -> &mut dyn EffectLayer {
        match kind {
            LayerKind::Cloud => &mut self.cloud,
            LayerKind::Wave => &mut self.wave,
            LayerKind::Halftone => &mut self.halftone,
            LayerKind::Drips => &mut self.drips,
            LayerKind::Post => &mut self.post,
        }
    }

    /// Advances visible layers only; hidden ones keep their last state.
    pub fn update_all(&mut self, elapsed: f32, level: AudioLevel) {
        for kind in LayerKind::ALL {
            let layer = self.get_mut(kind);
            if layer.is_visible() {
                layer.update(elapsed, level);
            }
        }
    }

    pub fn visibility(&self) -> [(LayerKind, bool); 5] {
        LayerKind::ALL.map(|k| (k, self.get(k).is_visible()))
    }
}
