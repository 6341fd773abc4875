//! Per-frame sample readings shared by every consumer of a tick.

/// One instantaneous reading of the signal.
///
/// `time_domain` holds amplitudes in \[-1, 1\], `frequency_domain` holds
/// normalized magnitudes in \[0, 1\]. Both are non-empty; values are clamped
/// on construction so downstream math never sees out-of-range input.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSnapshot {
    time_domain: Vec<f32>,
    frequency_domain: Vec<f32>,
}

impl SampleSnapshot {
    /// Returns `None` if either sequence is empty.
    pub fn new(time_domain: Vec<f32>, frequency_domain: Vec<f32>) -> Option<Self> {
        if time_domain.is_empty() || frequency_domain.is_empty() {
            return None;
        }
        Some(Self::from_parts(time_domain, frequency_domain))
    }

    /// Clamping constructor for producers that size their own buffers.
    /// An empty sequence is replaced by a single zero reading.
    pub(crate) fn from_parts(mut time_domain: Vec<f32>, mut frequency_domain: Vec<f32>) -> Self {
        if time_domain.is_empty() {
            time_domain.push(0.0);
        }
        if frequency_domain.is_empty() {
            frequency_domain.push(0.0);
        }
        for v in time_domain.iter_mut() {
            *v = sanitize(*v).clamp(-1.0, 1.0);
        }
        for v in frequency_domain.iter_mut() {
            *v = sanitize(*v).clamp(0.0, 1.0);
        }
        Self {
            time_domain,
            frequency_domain,
        }
    }

    pub fn time_domain(&self) -> &[f32] {
        &self.time_domain
    }

    pub fn frequency_domain(&self) -> &[f32] {
        &self.frequency_domain
    }

    pub fn bin_count(&self) -> usize {
        self.frequency_domain.len()
    }

    /// Mean magnitude of the frequency readings.
    pub fn audio_level(&self) -> AudioLevel {
        AudioLevel::from_magnitudes(&self.frequency_domain)
    }
}

#[inline]
fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Loudness summary in \[0, 1\] driving every reactive visual uniformly.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct AudioLevel(f32);

impl AudioLevel {
    pub const SILENT: AudioLevel = AudioLevel(0.0);

    pub fn new(value: f32) -> Self {
        Self(sanitize(value).clamp(0.0, 1.0))
    }

    pub fn from_magnitudes(magnitudes: &[f32]) -> Self {
        if magnitudes.is_empty() {
            return Self::SILENT;
        }
        let sum: f32 = magnitudes.iter().map(|m| sanitize(*m)).sum();
        Self::new(sum / magnitudes.len() as f32)
    }

    /// Linear blend; `t` is clamped to \[0, 1\].
    pub fn lerp(self, other: AudioLevel, t: f32) -> Self {
        let t = sanitize(t).clamp(0.0, 1.0);
        Self::new(self.0 + (other.0 - self.0) * t)
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}
