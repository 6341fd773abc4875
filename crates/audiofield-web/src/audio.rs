use std::cell::Cell;
use std::rc::Rc;

use audiofield_core::{DecodeError, NoBufferError, PlayError, Playing, SampleSnapshot, SignalSource};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

const ANALYSER_FFT_SIZE: u32 = 2048;

struct Current {
    node: web::AudioBufferSourceNode,
    instance: u64,
    _on_ended: Closure<dyn FnMut()>,
}

/// WebAudio graph: buffer source -> analyser -> gain -> destination.
///
/// Each `play()` builds a fresh `AudioBufferSourceNode`; the `ended` cell is
/// tagged with the instance id so a stale callback never ends a newer one.
pub struct WebAudioSource {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    gain: web::GainNode,
    buffer: Option<web::AudioBuffer>,
    current: Option<Current>,
    volume: f32,
    next_instance: u64,
    ended: Rc<Cell<u64>>,
}

fn js_err(what: &str, e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!("{what}: {e:?}")
}

impl WebAudioSource {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| js_err("AudioContext", e))?;
        let analyser = ctx
            .create_analyser()
            .map_err(|e| js_err("AnalyserNode", e))?;
        analyser.set_fft_size(ANALYSER_FFT_SIZE);
        analyser.set_smoothing_time_constant(0.0);
        let gain = ctx.create_gain().map_err(|e| js_err("GainNode", e))?;
        analyser
            .connect_with_audio_node(&gain)
            .map_err(|e| js_err("connect analyser", e))?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(|e| js_err("connect gain", e))?;
        log::info!(
            "[audio] context at {} Hz, fft {}",
            ctx.sample_rate(),
            ANALYSER_FFT_SIZE
        );
        Ok(Self {
            ctx,
            analyser,
            gain,
            buffer: None,
            current: None,
            volume: 1.0,
            next_instance: 0,
            ended: Rc::new(Cell::new(0)),
        })
    }

    pub fn context(&self) -> &web::AudioContext {
        &self.ctx
    }

    #[allow(deprecated)]
    fn start_instance(&mut self, buffer: &web::AudioBuffer) -> anyhow::Result<Current> {
        let node = self
            .ctx
            .create_buffer_source()
            .map_err(|e| js_err("AudioBufferSourceNode", e))?;
        node.set_buffer(Some(buffer));
        node.connect_with_audio_node(&self.analyser)
            .map_err(|e| js_err("connect source", e))?;

        self.next_instance += 1;
        let instance = self.next_instance;
        let ended = self.ended.clone();
        let on_ended = Closure::wrap(Box::new(move || ended.set(instance)) as Box<dyn FnMut()>);
        node.set_onended(Some(on_ended.as_ref().unchecked_ref()));
        node.start().map_err(|e| js_err("start", e))?;
        Ok(Current {
            node,
            instance,
            _on_ended: on_ended,
        })
    }
}

/// Decodes an encoded file in the page's audio context.
pub async fn decode_file(
    ctx: web::AudioContext,
    file: web::File,
) -> Result<web::AudioBuffer, DecodeError> {
    let bytes = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| DecodeError::Rejected(format!("read failed: {e:?}")))?
        .dyn_into::<js_sys::ArrayBuffer>()
        .map_err(|_| DecodeError::Malformed("file did not yield an ArrayBuffer".into()))?;
    if bytes.byte_length() == 0 {
        return Err(DecodeError::Empty);
    }
    let promise = ctx
        .decode_audio_data(&bytes)
        .map_err(|e| DecodeError::Rejected(format!("{e:?}")))?;
    let decoded = JsFuture::from(promise)
        .await
        .map_err(|e| DecodeError::Unsupported(format!("{e:?}")))?
        .dyn_into::<web::AudioBuffer>()
        .map_err(|_| DecodeError::Malformed("decoder returned a non-buffer".into()))?;
    log::info!(
        "[audio] decoded {} ({} ch, {:.2}s)",
        file.name(),
        decoded.number_of_channels(),
        decoded.duration()
    );
    Ok(decoded)
}

impl SignalSource for WebAudioSource {
    type Buffer = web::AudioBuffer;

    fn install(&mut self, buffer: web::AudioBuffer) {
        self.stop();
        self.buffer = Some(buffer);
    }

    fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    fn play(&mut self) -> Result<Playing, PlayError> {
        let buffer = self.buffer.clone().ok_or(NoBufferError)?;
        self.stop();
        if self.ctx.state() == web::AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
        self.gain.gain().set_value(self.volume);
        match self.start_instance(&buffer) {
            Ok(current) => {
                let instance = current.instance;
                self.current = Some(current);
                Ok(Playing { instance })
            }
            Err(e) => {
                log::error!("[audio] {e}");
                Err(PlayError::Backend(e.to_string()))
            }
        }
    }

    #[allow(deprecated)]
    fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.node.set_onended(None);
            let _ = current.node.stop();
            current.node.disconnect().ok();
        }
    }

    fn is_playing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| self.ended.get() != c.instance)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.gain.gain().set_value(self.volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn sample_snapshot(&self) -> Option<SampleSnapshot> {
        if !self.is_playing() {
            return None;
        }
        let bins = self.analyser.frequency_bin_count() as usize;
        let mut time = vec![0.0f32; bins];
        self.analyser.get_float_time_domain_data(&mut time);
        let mut bytes = vec![0u8; bins];
        self.analyser.get_byte_frequency_data(&mut bytes);
        let freq = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        SampleSnapshot::new(time, freq)
    }

    fn poll_ended(&mut self) -> bool {
        match &self.current {
            Some(c) if self.ended.get() == c.instance => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
