//! Signal sources: decoded buffers played against a clock, observed through
//! per-frame snapshots.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use crate::analysis::Analyser;
use crate::decode::{decode_wav, DecodedAudio};
use crate::error::{DecodeError, NoBufferError, PlayError};
use crate::snapshot::SampleSnapshot;

/// Monotonic seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock based on `instant`, which also works under wasm.
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: instant::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock; clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// A buffer was decoded and installed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ready {
    pub frames: usize,
    pub duration_secs: f64,
}

/// A fresh playback instance started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playing {
    pub instance: u64,
}

/// Owns the decoded buffer, the playback instance and its analysis tap.
///
/// At most one playback instance is live at a time: `play()` always replaces
/// the previous one. `sample_snapshot()` has no side effects.
pub trait SignalSource {
    /// Decoded audio handle produced by this source's decoder.
    type Buffer;

    /// Swaps in a decoded buffer, stopping any playing instance.
    fn install(&mut self, buffer: Self::Buffer);
    fn has_buffer(&self) -> bool;

    /// `PlayError::NoBuffer` with nothing installed.
    fn play(&mut self) -> Result<Playing, PlayError>;
    /// Idempotent.
    fn stop(&mut self);
    fn is_playing(&self) -> bool;

    /// Clamped to [0, 1]; kept for the next `play()` when nothing is live.
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;

    /// `None` unless playing.
    fn sample_snapshot(&self) -> Option<SampleSnapshot>;

    /// Reports a natural end of stream exactly once, leaving the source stopped.
    fn poll_ended(&mut self) -> bool;
}

#[derive(Clone, Copy, Debug)]
struct Playback {
    instance: u64,
    started_at: f64,
}

/// Clock-driven playback over an in-memory buffer.
///
/// The read position is `(clock.now() - started_at) * sample_rate`, so the
/// analysis follows whatever time base the clock reports. Native output
/// supplies a clock fed by the device callback; tests use [`ManualClock`].
pub struct BufferSource<C: Clock> {
    clock: C,
    analyser: Analyser,
    buffer: Option<Arc<DecodedAudio>>,
    playback: Option<Playback>,
    volume: f32,
    next_instance: u64,
}

impl<C: Clock> BufferSource<C> {
    pub fn new(clock: C, analyser: Analyser) -> Self {
        Self {
            clock,
            analyser,
            buffer: None,
            playback: None,
            volume: 1.0,
            next_instance: 0,
        }
    }

    /// Stops playback first, then decodes. On failure the previous buffer stays.
    pub fn load(&mut self, bytes: &[u8]) -> Result<Ready, DecodeError> {
        self.stop();
        let audio = Arc::new(decode_wav(bytes)?);
        let ready = Ready {
            frames: audio.frames(),
            duration_secs: audio.duration_secs(),
        };
        self.install(audio);
        Ok(ready)
    }

    pub fn buffer(&self) -> Option<&Arc<DecodedAudio>> {
        self.buffer.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current read position in frames, if a playback instance exists.
    pub fn position(&self) -> Option<usize> {
        let playback = self.playback?;
        let buffer = self.buffer.as_ref()?;
        let elapsed = (self.clock.now() - playback.started_at).max(0.0);
        Some((elapsed * buffer.sample_rate as f64) as usize)
    }

    fn finished(&self) -> bool {
        match (self.position(), self.buffer.as_ref()) {
            (Some(pos), Some(buffer)) => pos >= buffer.frames(),
            _ => false,
        }
    }
}

impl<C: Clock> SignalSource for BufferSource<C> {
    type Buffer = Arc<DecodedAudio>;

    fn install(&mut self, buffer: Arc<DecodedAudio>) {
        self.stop();
        self.buffer = Some(buffer);
    }

    fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    fn play(&mut self) -> Result<Playing, PlayError> {
        if self.buffer.is_none() {
            return Err(NoBufferError.into());
        }
        self.stop();
        let instance = self.next_instance;
        self.next_instance += 1;
        self.playback = Some(Playback {
            instance,
            started_at: self.clock.now(),
        });
        log::info!("[audio] playback instance {instance} started");
        Ok(Playing { instance })
    }

    fn stop(&mut self) {
        if let Some(p) = self.playback.take() {
            log::debug!("[audio] playback instance {} stopped", p.instance);
        }
    }

    fn is_playing(&self) -> bool {
        self.playback.is_some() && !self.finished()
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn sample_snapshot(&self) -> Option<SampleSnapshot> {
        if !self.is_playing() {
            return None;
        }
        let buffer = self.buffer.as_ref()?;
        let position = self.position()?;
        Some(self.analyser.analyse(&buffer.mono, position))
    }

    fn poll_ended(&mut self) -> bool {
        if self.playback.is_some() && self.finished() {
            self.playback = None;
            log::info!("[audio] playback reached end of buffer");
            return true;
        }
        false
    }
}
