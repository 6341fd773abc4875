//! Per-frame driver: drains pending messages, picks the live or idle
//! snapshot, runs the stage pipeline and hands the result to a renderer.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::analysis::Analyser;
use crate::config::VisualizerConfig;
use crate::error::{DecodeError, PlayError};
use crate::idle::IdleSignal;
use crate::layers::LayerStack;
use crate::paint::{DrawCommand, PanelSize, SpectrumPainter, WaveformPainter};
use crate::particles::ParticleField;
use crate::sections::{SectionBinder, SectionId};
use crate::snapshot::{AudioLevel, SampleSnapshot};
use crate::source::{BufferSource, Clock, SignalSource};
use crate::state::{Camera, Viewport};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    pub elapsed: f32,
    pub dt: f32,
    pub frame_index: u64,
    /// True when this frame's snapshot came from the signal source.
    pub live: bool,
    /// 0 = fully idle, 1 = fully live; ramps across mode changes.
    pub live_mix: f32,
    pub audio_level: AudioLevel,
}

#[derive(Clone, Debug)]
pub struct Panels {
    pub waveform_size: PanelSize,
    pub spectrum_size: PanelSize,
    pub waveform: Vec<DrawCommand>,
    pub spectrum: Vec<DrawCommand>,
}

/// Everything a frame produces, passed explicitly through the stages.
pub struct VisualizationContext {
    pub viewport: Viewport,
    pub camera: Camera,
    pub frame: FrameState,
    pub snapshot: SampleSnapshot,
    pub panels: Panels,
    pub particles: ParticleField,
    pub layers: LayerStack,
}

pub trait Stage {
    fn name(&self) -> &'static str;
    /// Stages run in ascending order.
    fn order(&self) -> i32;
    fn run(&mut self, ctx: &mut VisualizationContext);
}

pub trait Renderer {
    fn resize(&mut self, viewport: Viewport);
    fn render(&mut self, ctx: &VisualizationContext) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct PanelStage {
    waveform: WaveformPainter,
    spectrum: SpectrumPainter,
}

impl Stage for PanelStage {
    fn name(&self) -> &'static str {
        "panels"
    }
    fn order(&self) -> i32 {
        300
    }
    fn run(&mut self, ctx: &mut VisualizationContext) {
        let panels = &mut ctx.panels;
        self.waveform
            .paint(&ctx.snapshot, panels.waveform_size, &mut panels.waveform);
        self.spectrum
            .paint(&ctx.snapshot, panels.spectrum_size, &mut panels.spectrum);
    }
}

pub struct ParticleStage;

impl Stage for ParticleStage {
    fn name(&self) -> &'static str {
        "particles"
    }
    fn order(&self) -> i32 {
        400
    }
    fn run(&mut self, ctx: &mut VisualizationContext) {
        let live = ctx.frame.live.then_some(&ctx.snapshot);
        ctx.particles
            .update(live, ctx.frame.elapsed, ctx.frame.live_mix);
    }
}

pub struct LayerStage;

impl Stage for LayerStage {
    fn name(&self) -> &'static str {
        "layers"
    }
    fn order(&self) -> i32 {
        500
    }
    fn run(&mut self, ctx: &mut VisualizationContext) {
        ctx.layers
            .update_all(ctx.frame.elapsed, ctx.frame.audio_level);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub enum Message<B> {
    LoadRequested(LoadTicket),
    Decoded {
        ticket: LoadTicket,
        result: Result<B, DecodeError>,
    },
    Play,
    Stop,
    TogglePlayback,
    SetVolume(f32),
    SectionChanged(SectionId),
    Resize {
        width: u32,
        height: u32,
    },
    PanelsResized {
        waveform: PanelSize,
        spectrum: PanelSize,
    },
    /// Pointer drag over the scene, in surface pixels.
    OrbitDrag {
        dx: f32,
        dy: f32,
    },
}

/// Outbound events for whoever owns the page or window controls.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    PlaybackChanged { playing: bool },
    PlaybackEnded,
    ControlEnabled(bool),
    DecodeFailed(String),
    /// Play was requested with nothing loaded.
    PlayRejected,
    /// A buffer is loaded but the platform could not start it.
    PlaybackFailed(String),
}

/// Shared inbox; event callbacks post here and the scheduler drains it at
/// the start of the next tick.
pub struct Mailbox<B> {
    queue: Rc<RefCell<VecDeque<Message<B>>>>,
    tickets: Rc<Cell<u64>>,
}

impl<B> Clone for Mailbox<B> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            tickets: self.tickets.clone(),
        }
    }
}

impl<B> Default for Mailbox<B> {
    fn default() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
            tickets: Rc::new(Cell::new(0)),
        }
    }
}

impl<B> Mailbox<B> {
    pub fn post(&self, msg: Message<B>) {
        self.queue.borrow_mut().push_back(msg);
    }

    /// Issues a ticket for a new decode. Any earlier ticket becomes stale.
    pub fn begin_load(&self) -> LoadTicket {
        let ticket = LoadTicket(self.tickets.get() + 1);
        self.tickets.set(ticket.0);
        self.post(Message::LoadRequested(ticket));
        ticket
    }

    pub fn deliver_decoded(&self, ticket: LoadTicket, result: Result<B, DecodeError>) {
        self.post(Message::Decoded { ticket, result });
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn take_all(&self) -> VecDeque<Message<B>> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

pub struct FrameScheduler<S: SignalSource> {
    source: S,
    idle: IdleSignal,
    stages: Vec<Box<dyn Stage>>,
    ctx: VisualizationContext,
    mailbox: Mailbox<S::Buffer>,
    notices: Vec<Notice>,
    sections: SectionBinder,
    pending_load: Option<LoadTicket>,
    autoplay_on_load: bool,
    crossfade_secs: f32,
    start_time: Option<f64>,
    last_time: f64,
    last_live_level: AudioLevel,
}

impl<S: SignalSource> FrameScheduler<S> {
    pub fn new(mut source: S, config: &VisualizerConfig, viewport: Viewport) -> Self {
        source.set_volume(config.initial_volume);
        let idle = IdleSignal::new(config.idle_wave_points, config.idle_bars);
        let snapshot = idle.snapshot(0.0);
        let ctx = VisualizationContext {
            viewport,
            camera: Camera::for_viewport(viewport),
            frame: FrameState::default(),
            snapshot,
            panels: Panels {
                waveform_size: PanelSize::new(0.0, 0.0),
                spectrum_size: PanelSize::new(0.0, 0.0),
                waveform: Vec::new(),
                spectrum: Vec::new(),
            },
            particles: ParticleField::new(config.particle_count, config.seed),
            layers: LayerStack::new(config.halftone_count, config.drip_count, config.seed),
        };
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(PanelStage::default()),
            Box::new(ParticleStage),
            Box::new(LayerStage),
        ];
        log::info!(
            "[sched] ready: {} particles, {}x{} viewport",
            config.particle_count,
            viewport.width,
            viewport.height
        );
        Self {
            source,
            idle,
            stages,
            ctx,
            mailbox: Mailbox::default(),
            notices: Vec::new(),
            sections: SectionBinder::new(),
            pending_load: None,
            autoplay_on_load: config.autoplay_on_load,
            crossfade_secs: config.crossfade_secs.max(0.0),
            start_time: None,
            last_time: 0.0,
            last_live_level: AudioLevel::SILENT,
        }
    }

    pub fn mailbox(&self) -> Mailbox<S::Buffer> {
        self.mailbox.clone()
    }

    pub fn context(&self) -> &VisualizationContext {
        &self.ctx
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn control_enabled(&self) -> bool {
        self.source.has_buffer()
    }

    pub fn current_section(&self) -> Option<&SectionId> {
        self.sections.current()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Adds a stage, keeping the pipeline sorted by `order()`.
    pub fn register_stage(&mut self, stage: Box<dyn Stage>) {
        log::debug!("[sched] stage '{}' at {}", stage.name(), stage.order());
        self.stages.push(stage);
        self.stages.sort_by_key(|s| s.order());
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Applies a new surface size. Identical dimensions change nothing.
    pub fn on_resize(&mut self, width: u32, height: u32, renderer: &mut dyn Renderer) -> bool {
        let viewport = Viewport::new(width, height);
        if viewport == self.ctx.viewport {
            return false;
        }
        self.ctx.viewport = viewport;
        self.ctx.camera.aspect = viewport.aspect();
        renderer.resize(viewport);
        log::debug!("[sched] resized to {width}x{height}");
        true
    }

    pub fn on_section_changed(&mut self, id: SectionId) -> bool {
        self.sections.apply(id, &mut self.ctx.layers)
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.source.set_volume(volume);
    }

    pub fn play(&mut self) {
        match self.source.play() {
            Ok(p) => {
                log::debug!("[sched] playing instance {}", p.instance);
                self.notices.push(Notice::PlaybackChanged { playing: true });
            }
            Err(PlayError::NoBuffer(e)) => {
                log::debug!("[sched] play rejected: {e}");
                self.notices.push(Notice::PlayRejected);
            }
            Err(PlayError::Backend(msg)) => {
                log::error!("[sched] playback failed: {msg}");
                self.notices.push(Notice::PlaybackFailed(msg));
            }
        }
    }

    pub fn stop(&mut self) {
        let was_playing = self.source.is_playing();
        self.source.stop();
        if was_playing {
            self.notices.push(Notice::PlaybackChanged { playing: false });
        }
    }

    fn apply(&mut self, msg: Message<S::Buffer>, renderer: &mut dyn Renderer) {
        match msg {
            Message::LoadRequested(ticket) => {
                self.stop();
                self.pending_load = Some(ticket);
            }
            Message::Decoded { ticket, result } => {
                if self.pending_load != Some(ticket) {
                    log::debug!("[sched] discarding stale decode {:?}", ticket);
                    return;
                }
                self.pending_load = None;
                match result {
                    Ok(buffer) => {
                        self.source.install(buffer);
                        log::info!("[sched] buffer installed");
                        self.notices.push(Notice::ControlEnabled(true));
                        if self.autoplay_on_load {
                            self.play();
                        }
                    }
                    Err(e) => {
                        log::warn!("[sched] decode failed: {e}");
                        self.notices.push(Notice::DecodeFailed(e.to_string()));
                    }
                }
            }
            Message::Play => self.play(),
            Message::Stop => self.stop(),
            Message::TogglePlayback => {
                if self.source.is_playing() {
                    self.stop();
                } else {
                    self.play();
                }
            }
            Message::SetVolume(v) => self.set_volume(v),
            Message::SectionChanged(id) => {
                self.on_section_changed(id);
            }
            Message::Resize { width, height } => {
                self.on_resize(width, height, renderer);
            }
            Message::PanelsResized { waveform, spectrum } => {
                self.ctx.panels.waveform_size = waveform;
                self.ctx.panels.spectrum_size = spectrum;
            }
            Message::OrbitDrag { dx, dy } => {
                let height = self.ctx.viewport.height as f32;
                self.ctx.camera.orbit.drag(dx, dy, height);
            }
        }
    }

    /// Runs one frame at time `now_secs`. Never fails; render errors are
    /// logged and the next tick proceeds normally.
    pub fn tick(&mut self, now_secs: f64, renderer: &mut dyn Renderer) {
        let start = *self.start_time.get_or_insert(now_secs);
        let dt = if self.ctx.frame.frame_index == 0 {
            0.0
        } else {
            (now_secs - self.last_time).max(0.0) as f32
        };
        self.last_time = now_secs;
        let elapsed = (now_secs - start).max(0.0) as f32;

        for msg in self.mailbox.take_all() {
            self.apply(msg, renderer);
        }
        if self.source.poll_ended() {
            self.notices.push(Notice::PlaybackEnded);
            self.notices.push(Notice::PlaybackChanged { playing: false });
        }

        let live_snapshot = self.source.sample_snapshot();
        let live = live_snapshot.is_some();
        let target = if live { 1.0 } else { 0.0 };
        let live_mix = if self.crossfade_secs <= 0.0 {
            target
        } else {
            approach(self.ctx.frame.live_mix, target, dt / self.crossfade_secs)
        };

        if let Some(snap) = &live_snapshot {
            self.last_live_level = snap.audio_level();
        }
        let idle_level = self.idle.level(elapsed);
        let audio_level = idle_level.lerp(self.last_live_level, live_mix);

        self.ctx.snapshot = match live_snapshot {
            Some(snap) => snap,
            None => self.idle.snapshot(elapsed),
        };
        self.ctx.frame = FrameState {
            elapsed,
            dt,
            frame_index: self.ctx.frame.frame_index + 1,
            live,
            live_mix,
            audio_level,
        };
        self.ctx.camera.update_orbit();

        for stage in self.stages.iter_mut() {
            stage.run(&mut self.ctx);
        }
        log::trace!(
            "[sched] frame {} live={} mix={:.2} level={:.3}",
            self.ctx.frame.frame_index,
            live,
            live_mix,
            audio_level.get()
        );

        if let Err(e) = renderer.render(&self.ctx) {
            log::error!("[render] frame {} failed: {e:?}", self.ctx.frame.frame_index);
        }
    }
}

impl<C: Clock> FrameScheduler<BufferSource<C>> {
    /// Builds a scheduler around a clock-driven buffer source.
    pub fn with_clock(clock: C, config: &VisualizerConfig, viewport: Viewport) -> Self {
        let source = BufferSource::new(clock, Analyser::new(config.fft_size));
        Self::new(source, config, viewport)
    }
}

#[inline]
fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}
