//! WAV decoding into a shared sample buffer.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use crate::error::DecodeError;

/// Decoded PCM, interleaved plus a mono mix-down for analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved: Vec<f32>,
    pub mono: Vec<f32>,
}

impl DecodedAudio {
    /// Builds a buffer from interleaved samples, mixing down to mono.
    pub fn from_interleaved(
        sample_rate: u32,
        channels: u16,
        interleaved: Vec<f32>,
    ) -> Result<Self, DecodeError> {
        if channels == 0 || sample_rate == 0 {
            return Err(DecodeError::Malformed(format!(
                "{channels} channels at {sample_rate} Hz"
            )));
        }
        let mono = interleaved
            .chunks_exact(channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect::<Vec<_>>();
        if mono.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(Self {
            sample_rate,
            channels,
            interleaved,
            mono,
        })
    }

    /// Number of sample frames (per channel).
    pub fn frames(&self) -> usize {
        self.mono.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let interleaved = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits @ 1..=32) => {
            let full_scale = (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<Vec<_>, _>>()?
        }
        (format, bits) => {
            return Err(DecodeError::Unsupported(format!(
                "{bits}-bit {format:?} samples"
            )))
        }
    };
    let audio = DecodedAudio::from_interleaved(spec.sample_rate, spec.channels, interleaved)?;
    log::info!(
        "[audio] decoded {} frames, {} ch @ {} Hz ({:.2}s)",
        audio.frames(),
        audio.channels,
        audio.sample_rate,
        audio.duration_secs()
    );
    Ok(audio)
}
