//! Synthetic signal shown while nothing is playing.

use crate::constants::{IDLE_BARS, IDLE_LEVEL_RATE, IDLE_WAVE_POINTS};
use crate::snapshot::{AudioLevel, SampleSnapshot};

/// Deterministic idle readings as a pure function of time.
#[derive(Clone, Debug)]
pub struct IdleSignal {
    points: usize,
    bars: usize,
}

impl Default for IdleSignal {
    fn default() -> Self {
        Self::new(IDLE_WAVE_POINTS, IDLE_BARS)
    }
}

impl IdleSignal {
    /// Zero counts are bumped to 1 so the snapshot is never empty.
    pub fn new(points: usize, bars: usize) -> Self {
        Self {
            points: points.max(1),
            bars: bars.max(1),
        }
    }

    pub fn snapshot(&self, t: f32) -> SampleSnapshot {
        let t = finite_or_zero(t);
        let time_domain = (0..self.points)
            .map(|i| {
                let v01 = (i as f32 * 0.1 + t).sin() * 0.25 + 0.5;
                2.0 * v01 - 1.0
            })
            .collect::<Vec<_>>();
        let frequency_domain = (0..self.bars)
            .map(|i| ((i as f32 * 0.2 + t).sin() * 0.25 + 0.3).clamp(0.0, 1.0))
            .collect::<Vec<_>>();
        SampleSnapshot::from_parts(time_domain, frequency_domain)
    }

    /// `sin(2t) * 0.25 + 0.25`, which stays inside [0, 0.5].
    pub fn level(&self, t: f32) -> AudioLevel {
        let t = finite_or_zero(t);
        AudioLevel::new((IDLE_LEVEL_RATE * t).sin() * 0.25 + 0.25)
    }
}

#[inline]
fn finite_or_zero(t: f32) -> f32 {
    if t.is_finite() {
        t
    } else {
        0.0
    }
}
