// Frame scheduler driven by a manual clock and a recording renderer.

use std::io::Cursor;
use std::sync::Arc;

use audiofield_core::{
    decode_wav, BufferSource, DecodeError, DrawCommand, EffectLayer, FrameScheduler, ManualClock,
    Message, NoBufferError, Notice, PanelSize, PlayError, Playing, Renderer, SampleSnapshot,
    SignalSource, Stage, Viewport, VisualizationContext, VisualizerConfig,
};

#[derive(Default)]
struct Recorder {
    resizes: Vec<Viewport>,
    frames: Vec<(u64, bool, f32)>,
    fail_next: bool,
}

impl Renderer for Recorder {
    fn resize(&mut self, viewport: Viewport) {
        self.resizes.push(viewport);
    }

    fn render(&mut self, ctx: &VisualizationContext) -> anyhow::Result<()> {
        if std::mem::take(&mut self.fail_next) {
            anyhow::bail!("device lost");
        }
        self.frames.push((
            ctx.frame.frame_index,
            ctx.frame.live,
            ctx.frame.audio_level.get(),
        ));
        Ok(())
    }
}

fn small_config() -> VisualizerConfig {
    VisualizerConfig {
        particle_count: 32,
        drip_count: 4,
        halftone_count: 16,
        ..VisualizerConfig::default()
    }
}

fn tone(secs: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut w = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..(secs * 8000.0) as usize {
            let s = (i as f32 * 0.3).sin() * 0.9;
            w.write_sample((s * 30000.0) as i16).unwrap();
        }
        w.finalize().unwrap();
    }
    cursor.into_inner()
}

type Sched = FrameScheduler<BufferSource<ManualClock>>;

fn scheduler(config: &VisualizerConfig) -> (ManualClock, Sched) {
    let clock = ManualClock::new();
    let sched = FrameScheduler::with_clock(clock.clone(), config, Viewport::new(800, 600));
    (clock, sched)
}

fn load(sched: &Sched, secs: f32) {
    let mailbox = sched.mailbox();
    let ticket = mailbox.begin_load();
    let result = decode_wav(&tone(secs)).map(Arc::new);
    mailbox.deliver_decoded(ticket, result);
}

#[test]
fn idle_frames_before_any_load() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    sched.tick(0.0, &mut r);
    sched.tick(0.016, &mut r);
    assert_eq!(r.frames.len(), 2);
    assert!(r.frames.iter().all(|f| !f.1));
    assert_eq!(sched.context().snapshot.time_domain().len(), 100);
    assert_eq!(sched.context().snapshot.frequency_domain().len(), 64);
    assert_eq!(sched.context().frame.frame_index, 2);
}

#[test]
fn play_without_load_is_rejected_and_control_stays_disabled() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    sched.mailbox().post(Message::Play);
    sched.tick(0.0, &mut r);
    assert_eq!(sched.drain_notices(), vec![Notice::PlayRejected]);
    assert!(!sched.control_enabled());
    assert!(!sched.context().frame.live);
}

/// Accepts buffers but never manages to start them.
#[derive(Default)]
struct RefusingOutput {
    loaded: bool,
    volume: f32,
}

impl SignalSource for RefusingOutput {
    type Buffer = ();

    fn install(&mut self, _buffer: ()) {
        self.loaded = true;
    }

    fn has_buffer(&self) -> bool {
        self.loaded
    }

    fn play(&mut self) -> Result<Playing, PlayError> {
        if !self.loaded {
            return Err(NoBufferError.into());
        }
        Err(PlayError::Backend("output device busy".into()))
    }

    fn stop(&mut self) {}

    fn is_playing(&self) -> bool {
        false
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn sample_snapshot(&self) -> Option<SampleSnapshot> {
        None
    }

    fn poll_ended(&mut self) -> bool {
        false
    }
}

#[test]
fn start_failure_is_reported_separately_from_missing_buffer() {
    let mut sched =
        FrameScheduler::new(RefusingOutput::default(), &small_config(), Viewport::new(800, 600));
    let mut r = Recorder::default();
    sched.mailbox().post(Message::Play);
    sched.tick(0.0, &mut r);
    assert_eq!(sched.drain_notices(), vec![Notice::PlayRejected]);

    let mailbox = sched.mailbox();
    let ticket = mailbox.begin_load();
    mailbox.deliver_decoded(ticket, Ok(()));
    sched.tick(0.016, &mut r);
    assert_eq!(
        sched.drain_notices(),
        vec![
            Notice::ControlEnabled(true),
            Notice::PlaybackFailed("output device busy".into())
        ]
    );
    assert!(sched.control_enabled());
    assert!(!sched.context().frame.live);
}

#[test]
fn load_autoplays_and_goes_live() {
    let (clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    load(&sched, 2.0);
    sched.tick(0.0, &mut r);
    assert_eq!(
        sched.drain_notices(),
        vec![
            Notice::ControlEnabled(true),
            Notice::PlaybackChanged { playing: true }
        ]
    );
    clock.advance(0.5);
    sched.tick(0.5, &mut r);
    let ctx = sched.context();
    assert!(ctx.frame.live);
    assert_eq!(ctx.snapshot.time_domain().len(), ctx.snapshot.bin_count());
    assert!(ctx
        .snapshot
        .frequency_domain()
        .iter()
        .all(|m| (0.0..=1.0).contains(m)));
    assert!((0.0..=1.0).contains(&ctx.frame.audio_level.get()));
}

#[test]
fn stale_decode_results_are_ignored() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    let mailbox = sched.mailbox();
    let first = mailbox.begin_load();
    let second = mailbox.begin_load();
    mailbox.deliver_decoded(first, decode_wav(&tone(0.5)).map(Arc::new));
    sched.tick(0.0, &mut r);
    assert!(!sched.control_enabled());
    assert!(sched.drain_notices().is_empty());

    mailbox.deliver_decoded(second, Err(DecodeError::Rejected("bad data".into())));
    sched.tick(0.016, &mut r);
    let notices = sched.drain_notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(&notices[0], Notice::DecodeFailed(msg) if msg.contains("bad data")));
    assert!(!sched.control_enabled());
}

#[test]
fn stop_takes_effect_on_next_tick() {
    let (clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    load(&sched, 2.0);
    sched.tick(0.0, &mut r);
    clock.advance(0.1);
    sched.tick(0.1, &mut r);
    assert!(sched.context().frame.live);

    sched.mailbox().post(Message::Stop);
    clock.advance(0.016);
    sched.tick(0.116, &mut r);
    assert!(!sched.context().frame.live);
    assert_eq!(sched.context().snapshot.time_domain().len(), 100);
}

#[test]
fn end_of_stream_is_reported_once() {
    let (clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    load(&sched, 0.2);
    sched.tick(0.0, &mut r);
    sched.drain_notices();
    clock.advance(0.5);
    sched.tick(0.5, &mut r);
    assert_eq!(
        sched.drain_notices(),
        vec![
            Notice::PlaybackEnded,
            Notice::PlaybackChanged { playing: false }
        ]
    );
    clock.advance(0.1);
    sched.tick(0.6, &mut r);
    assert!(sched.drain_notices().is_empty());
    assert!(!sched.source().is_playing());
}

#[test]
fn level_is_continuous_across_mode_changes() {
    let (clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    let dt = 1.0 / 60.0;
    let mut now = 0.0;
    let mut frames = Vec::new();
    for frame in 0..120 {
        if frame == 30 {
            load(&sched, 5.0);
        }
        if frame == 80 {
            sched.mailbox().post(Message::Stop);
        }
        sched.tick(now, &mut r);
        frames.push(sched.context().frame);
        now += dt;
        clock.advance(dt);
    }
    let step = (dt / 0.35) as f32 + 1e-4;
    for pair in frames.windows(2) {
        assert!((pair[1].live_mix - pair[0].live_mix).abs() <= step);
    }
    assert_eq!(frames[29].live_mix, 0.0);
    assert!(frames[30].live && frames[30].live_mix > 0.0);
    assert_eq!(frames[79].live_mix, 1.0);
    assert!(!frames[80].live && frames[80].live_mix < 1.0);

    // The idle sinusoid moves at most 0.5 * dt per frame on top of the ramp.
    let bound = step + 0.5 * dt as f32 + 1e-4;
    for switch in [30, 80] {
        let before = frames[switch - 1].audio_level.get();
        let after = frames[switch].audio_level.get();
        assert!((after - before).abs() <= bound, "jump at frame {switch}");
    }
}

#[test]
fn resize_is_idempotent() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    assert!(!sched.on_resize(800, 600, &mut r));
    assert!(r.resizes.is_empty());

    sched.mailbox().post(Message::Resize {
        width: 1024,
        height: 512,
    });
    sched.mailbox().post(Message::Resize {
        width: 1024,
        height: 512,
    });
    sched.tick(0.0, &mut r);
    assert_eq!(r.resizes, vec![Viewport::new(1024, 512)]);
    assert_eq!(sched.context().viewport, Viewport::new(1024, 512));
    assert!((sched.context().camera.aspect - 2.0).abs() < 1e-6);
}

#[test]
fn orbit_drags_turn_the_camera_over_several_frames() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    sched.tick(0.0, &mut r);
    let start = sched.context().camera.eye;

    sched.mailbox().post(Message::OrbitDrag { dx: 60.0, dy: 0.0 });
    sched.tick(0.016, &mut r);
    let first = sched.context().camera.eye;
    assert!(first.x < start.x);
    sched.tick(0.032, &mut r);
    let second = sched.context().camera.eye;
    // still easing after the drag message was consumed
    assert!(second.x < first.x);
    assert!(!sched.context().camera.orbit.is_settled());
}

#[test]
fn render_errors_do_not_stop_the_loop() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder {
        fail_next: true,
        ..Recorder::default()
    };
    sched.tick(0.0, &mut r);
    sched.tick(0.016, &mut r);
    assert_eq!(r.frames.len(), 1);
    assert_eq!(r.frames[0].0, 2);
}

#[test]
fn section_messages_switch_layers() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    sched
        .mailbox()
        .post(Message::SectionChanged("experience".into()));
    sched.tick(0.0, &mut r);
    let layers = &sched.context().layers;
    assert!(layers.wave.is_visible());
    assert!(!layers.cloud.is_visible());
    assert_eq!(sched.current_section().map(|s| s.as_str()), Some("experience"));
}

#[test]
fn panels_are_painted_each_frame() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    sched.mailbox().post(Message::PanelsResized {
        waveform: PanelSize::new(300.0, 100.0),
        spectrum: PanelSize::new(300.0, 100.0),
    });
    sched.tick(0.0, &mut r);
    let panels = &sched.context().panels;
    assert!(matches!(panels.waveform[0], DrawCommand::Clear { .. }));
    assert!(matches!(
        panels.waveform[1],
        DrawCommand::StrokePolyline { ref points, .. } if points.len() == 100
    ));
    assert!(panels
        .spectrum
        .iter()
        .skip(1)
        .all(|c| matches!(c, DrawCommand::FillRect { .. })));
}

struct Counter(std::rc::Rc<std::cell::Cell<u32>>);

impl Stage for Counter {
    fn name(&self) -> &'static str {
        "counter"
    }
    fn order(&self) -> i32 {
        450
    }
    fn run(&mut self, _ctx: &mut VisualizationContext) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn extra_stages_run_in_order() {
    let (_clock, mut sched) = scheduler(&small_config());
    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    sched.register_stage(Box::new(Counter(count.clone())));
    assert_eq!(
        sched.stage_names(),
        vec!["panels", "particles", "counter", "layers"]
    );
    let mut r = Recorder::default();
    sched.tick(0.0, &mut r);
    sched.tick(0.1, &mut r);
    assert_eq!(count.get(), 2);
}

#[test]
fn volume_messages_reach_the_source() {
    let (_clock, mut sched) = scheduler(&small_config());
    let mut r = Recorder::default();
    sched.mailbox().post(Message::SetVolume(0.25));
    sched.tick(0.0, &mut r);
    assert_eq!(sched.source().volume(), 0.25);
}
