// ---------------- Native audio (cpal) ----------------

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use audiofield_core::{
    Analyser, BufferSource, Clock, DecodedAudio, PlayError, Playing, SampleSnapshot, SignalSource,
    SystemClock,
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Time base for playback and analysis.
///
/// With an output device this counts frames the device has consumed, so the
/// analysed window tracks what is audible. Without one it falls back to the
/// wall clock and playback is silent.
#[derive(Clone)]
pub enum StreamClock {
    Device { frames: Arc<AtomicU64>, rate: f64 },
    Wall(SystemClock),
}

impl Clock for StreamClock {
    fn now(&self) -> f64 {
        match self {
            StreamClock::Device { frames, rate } => frames.load(Ordering::Acquire) as f64 / rate,
            StreamClock::Wall(clock) => clock.now(),
        }
    }
}

const STOPPED: u64 = u64::MAX;

/// State shared with the output callback. Gain and start time are atomics;
/// the buffer is only swapped on load, and a contended lock yields silence.
struct Voice {
    audio: Mutex<Option<Arc<DecodedAudio>>>,
    started_at: AtomicU64,
    gain: AtomicU32,
}

impl Voice {
    fn new(gain: f32) -> Self {
        Self {
            audio: Mutex::new(None),
            started_at: AtomicU64::new(STOPPED),
            gain: AtomicU32::new(gain.to_bits()),
        }
    }

    fn set_started(&self, at: Option<f64>) {
        let bits = at.map_or(STOPPED, f64::to_bits);
        self.started_at.store(bits, Ordering::Release);
    }

    fn started(&self) -> Option<f64> {
        match self.started_at.load(Ordering::Acquire) {
            STOPPED => None,
            bits => Some(f64::from_bits(bits)),
        }
    }

    fn set_gain(&self, gain: f32) {
        self.gain.store(gain.to_bits(), Ordering::Release);
    }

    fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Acquire))
    }
}

/// One callback's view of the live instance.
#[derive(Clone, Copy)]
struct Cue<'a> {
    audio: &'a DecodedAudio,
    started_at: f64,
    gain: f32,
}

/// Writes `out` starting at device frame `first_frame`; silence without a
/// cue or past the end of the buffer.
fn fill<T>(out: &mut [T], channels: usize, rate: f64, first_frame: u64, cue: Option<Cue<'_>>)
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    for (i, frame) in out.chunks_mut(channels.max(1)).enumerate() {
        let source_frame = cue.and_then(|cue| {
            let t = (first_frame + i as u64) as f64 / rate - cue.started_at;
            if t < 0.0 {
                return None;
            }
            let idx = (t * cue.audio.sample_rate as f64) as usize;
            (idx < cue.audio.frames()).then_some((cue, idx))
        });
        for (c, slot) in frame.iter_mut().enumerate() {
            let v = match source_frame {
                Some((cue, idx)) => {
                    let audio = cue.audio;
                    let ch = c.min(audio.channels as usize - 1);
                    audio.interleaved[idx * audio.channels as usize + ch] * cue.gain
                }
                None => 0.0,
            };
            *slot = T::from_sample(v);
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frames: Arc<AtomicU64>,
    voice: Arc<Voice>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let rate = config.sample_rate.0 as f64;
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let first = frames.load(Ordering::Acquire);
            let audio = voice.audio.try_lock().ok().and_then(|g| g.clone());
            let cue = match (audio.as_deref(), voice.started()) {
                (Some(audio), Some(started_at)) => Some(Cue {
                    audio,
                    started_at,
                    gain: voice.gain(),
                }),
                _ => None,
            };
            fill(data, channels, rate, first, cue);
            frames.fetch_add((data.len() / channels.max(1)) as u64, Ordering::Release);
        },
        |err| log::error!("[audio] stream error: {err}"),
        None,
    )
}

fn open_output(voice: Arc<Voice>) -> anyhow::Result<(cpal::Stream, StreamClock)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no output device"))?;
    let supported = device.default_output_config()?;
    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    let frames = Arc::new(AtomicU64::new(0));

    let stream = match format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, frames.clone(), voice)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, frames.clone(), voice)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, frames.clone(), voice)?,
        other => anyhow::bail!("unsupported sample format {other:?}"),
    };
    stream.play()?;
    log::info!(
        "[audio] output {} Hz x{} ({format:?})",
        config.sample_rate.0,
        config.channels
    );
    let clock = StreamClock::Device {
        frames,
        rate: config.sample_rate.0 as f64,
    };
    Ok((stream, clock))
}

/// In-memory buffer playback through the default output device.
pub struct CpalSource {
    inner: BufferSource<StreamClock>,
    voice: Arc<Voice>,
    _stream: Option<cpal::Stream>,
}

impl CpalSource {
    pub fn new(analyser: Analyser) -> Self {
        let voice = Arc::new(Voice::new(1.0));
        let (stream, clock) = match open_output(voice.clone()) {
            Ok((stream, clock)) => (Some(stream), clock),
            Err(e) => {
                log::warn!("[audio] {e}; visualizing without sound");
                (None, StreamClock::Wall(SystemClock::default()))
            }
        };
        Self {
            inner: BufferSource::new(clock, analyser),
            voice,
            _stream: stream,
        }
    }
}

impl SignalSource for CpalSource {
    type Buffer = Arc<DecodedAudio>;

    fn install(&mut self, buffer: Arc<DecodedAudio>) {
        self.inner.install(buffer.clone());
        self.voice.set_started(None);
        match self.voice.audio.lock() {
            Ok(mut slot) => *slot = Some(buffer),
            Err(_) => log::error!("[audio] output buffer lock poisoned"),
        }
    }

    fn has_buffer(&self) -> bool {
        self.inner.has_buffer()
    }

    fn play(&mut self) -> Result<Playing, PlayError> {
        let playing = self.inner.play()?;
        self.voice.set_gain(self.inner.volume());
        self.voice.set_started(Some(self.inner.clock().now()));
        Ok(playing)
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.voice.set_started(None);
    }

    fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    fn set_volume(&mut self, volume: f32) {
        self.inner.set_volume(volume);
        self.voice.set_gain(self.inner.volume());
    }

    fn volume(&self) -> f32 {
        self.inner.volume()
    }

    fn sample_snapshot(&self) -> Option<SampleSnapshot> {
        self.inner.sample_snapshot()
    }

    fn poll_ended(&mut self) -> bool {
        let ended = self.inner.poll_ended();
        if ended {
            self.voice.set_started(None);
        }
        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_ramp() -> Arc<DecodedAudio> {
        // 4 frames at 4 Hz: left = frame / 4, right = negated
        let interleaved = vec![0.0, -0.0, 0.25, -0.25, 0.5, -0.5, 0.75, -0.75];
        Arc::new(DecodedAudio::from_interleaved(4, 2, interleaved).unwrap())
    }

    #[test]
    fn no_cue_writes_silence() {
        let mut out = [1.0f32; 6];
        fill(&mut out, 2, 4.0, 0, None);
        assert_eq!(out, [0.0; 6]);
    }

    #[test]
    fn cue_follows_device_frames_and_gain() {
        let audio = stereo_ramp();
        let cue = Cue {
            audio: &audio,
            started_at: 0.5,
            gain: 0.5,
        };
        // device at 4 Hz: frames 2..6 cover t = 0.5..1.5
        let mut out = [9.0f32; 8];
        fill(&mut out, 2, 4.0, 2, Some(cue));
        assert_eq!(out, [0.0, -0.0, 0.125, -0.125, 0.25, -0.25, 0.375, -0.375]);

        // past the end
        let mut tail = [9.0f32; 2];
        fill(&mut tail, 2, 4.0, 6, Some(cue));
        assert_eq!(tail, [0.0, 0.0]);
    }

    #[test]
    fn mono_buffer_fans_out_to_every_channel() {
        let audio = DecodedAudio::from_interleaved(2, 1, vec![0.5, 1.0]).unwrap();
        let cue = Cue {
            audio: &audio,
            started_at: 0.0,
            gain: 1.0,
        };
        let mut out = [0.0f32; 6];
        fill(&mut out, 3, 2.0, 1, Some(cue));
        assert_eq!(out, [1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn integer_output_is_scaled() {
        let audio = DecodedAudio::from_interleaved(1, 1, vec![1.0]).unwrap();
        let cue = Cue {
            audio: &audio,
            started_at: 0.0,
            gain: 1.0,
        };
        let mut out = [0i16; 2];
        fill(&mut out, 1, 1.0, 0, Some(cue));
        assert_eq!(out, [i16::MAX, 0]);
    }

    #[test]
    fn wall_clock_source_drives_the_shared_voice() {
        let mut src = CpalSource {
            inner: BufferSource::new(StreamClock::Wall(SystemClock::default()), Analyser::new(64)),
            voice: Arc::new(Voice::new(1.0)),
            _stream: None,
        };
        assert!(src.play().is_err());
        src.install(stereo_ramp());
        assert!(src.voice.audio.lock().unwrap().is_some());
        src.set_volume(0.3);
        assert!(src.play().is_ok());
        assert!(src.voice.started().is_some());
        assert!((src.voice.gain() - 0.3).abs() < 1e-6);
        src.stop();
        assert!(src.voice.started().is_none());
    }
}
