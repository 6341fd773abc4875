//! Windowed FFT analysis with AnalyserNode-compatible scaling.
//!
//! Readings are a pure function of the sample buffer and the read position:
//! no smoothing state is carried between calls, so the same position always
//! yields the same snapshot.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::constants::{DEFAULT_FFT_SIZE, MAX_DECIBELS, MIN_DECIBELS};
use crate::snapshot::SampleSnapshot;

pub struct Analyser {
    fft_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser")
            .field("fft_size", &self.fft_size)
            .finish()
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE)
    }
}

impl Analyser {
    /// `fft_size` is rounded up to a power of two in [32, 32768].
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.clamp(32, 32768).next_power_of_two();
        let window = (0..fft_size).map(|i| blackman(i, fft_size)).collect();
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self {
            fft_size,
            window,
            fft,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Readings for the window ending (exclusively) at `position`.
    pub fn analyse(&self, mono: &[f32], position: usize) -> SampleSnapshot {
        let n = self.bin_count();
        let time_domain = (0..n)
            .map(|k| sample_before(mono, position, n - k))
            .collect::<Vec<_>>();

        let mut spectrum = (0..self.fft_size)
            .map(|k| {
                let s = sample_before(mono, position, self.fft_size - k);
                Complex::new(s * self.window[k], 0.0)
            })
            .collect::<Vec<_>>();
        self.fft.process(&mut spectrum);

        let scale = 1.0 / self.fft_size as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        let frequency_domain = spectrum[..n]
            .iter()
            .map(|c| {
                let mag = c.norm() * scale;
                if mag <= 0.0 {
                    return 0.0;
                }
                let db = 20.0 * mag.log10();
                ((db - MIN_DECIBELS) / range).clamp(0.0, 1.0)
            })
            .collect::<Vec<_>>();

        SampleSnapshot::from_parts(time_domain, frequency_domain)
    }
}

/// Sample `back` steps before `position`; silence outside the buffer.
#[inline]
fn sample_before(mono: &[f32], position: usize, back: usize) -> f32 {
    position
        .checked_sub(back)
        .and_then(|i| mono.get(i))
        .copied()
        .unwrap_or(0.0)
}

/// Blackman window (a = 0.16), the AnalyserNode default.
pub fn blackman(index: usize, size: usize) -> f32 {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}
