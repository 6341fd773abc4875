use crate::constants::{
    CROSSFADE_SECS, DEFAULT_FFT_SIZE, DRIP_COUNT, HALFTONE_COUNT, IDLE_BARS, IDLE_WAVE_POINTS,
    PARTICLE_COUNT,
};

/// Tunables for a visualizer instance. Front-ends start from `default()` and
/// override what their CLI or page exposes.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualizerConfig {
    pub particle_count: usize,
    pub drip_count: usize,
    pub halftone_count: usize,
    pub fft_size: usize,
    pub idle_wave_points: usize,
    pub idle_bars: usize,
    pub seed: u64,
    pub crossfade_secs: f32,
    pub initial_volume: f32,
    /// Start playback as soon as a decoded buffer is installed.
    pub autoplay_on_load: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            drip_count: DRIP_COUNT,
            halftone_count: HALFTONE_COUNT,
            fft_size: DEFAULT_FFT_SIZE,
            idle_wave_points: IDLE_WAVE_POINTS,
            idle_bars: IDLE_BARS,
            seed: 0x5EED_A0D1,
            crossfade_secs: CROSSFADE_SECS,
            initial_volume: 1.0,
            autoplay_on_load: true,
        }
    }
}
