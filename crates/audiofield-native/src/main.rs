use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use audiofield_core::sections::SECTION_TABLE;
use audiofield_core::{
    decode_wav, Analyser, FrameScheduler, Mailbox, Message, Notice, SectionId, SignalSource,
    Viewport, VisualizerConfig,
};
use audiofield_render::GpuRenderer;

mod audio;

use audio::CpalSource;

const VOLUME_STEP: f32 = 0.1;

/// Audio-reactive particle and spectrum visualizer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// WAV file to load and play on startup.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Initial volume in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Section whose effect layer is shown first (about, skills, ...).
    #[arg(long)]
    section: Option<String>,

    /// Seed for particle, drip and halftone layout.
    #[arg(long)]
    seed: Option<u64>,
}

type NativeMailbox = Mailbox<Arc<audiofield_core::DecodedAudio>>;

fn load_file(path: &Path, mailbox: &NativeMailbox) {
    let ticket = mailbox.begin_load();
    let result = std::fs::read(path)
        .map_err(|e| audiofield_core::DecodeError::Rejected(format!("{}: {e}", path.display())))
        .and_then(|bytes| decode_wav(&bytes))
        .map(Arc::new);
    if let Err(e) = &result {
        log::error!("[load] {e}");
    }
    mailbox.deliver_decoded(ticket, result);
}

fn handle_key(key: &Key, volume: f32, mailbox: &NativeMailbox) {
    match key {
        Key::Named(NamedKey::Space) => mailbox.post(Message::TogglePlayback),
        Key::Named(NamedKey::ArrowUp) => mailbox.post(Message::SetVolume(volume + VOLUME_STEP)),
        Key::Named(NamedKey::ArrowDown) => mailbox.post(Message::SetVolume(volume - VOLUME_STEP)),
        Key::Character(c) => {
            let section = c
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| SECTION_TABLE.get(i));
            if let Some((id, _)) = section {
                mailbox.post(Message::SectionChanged(SectionId::from(*id)));
            }
        }
        _ => {}
    }
}

/// Left-button drag state; positions in physical pixels.
#[derive(Default)]
struct MouseDrag {
    held: bool,
    last: Option<(f64, f64)>,
}

impl MouseDrag {
    fn press(&mut self, held: bool) {
        self.held = held;
    }

    /// Records the cursor and returns the drag delta while the button is held.
    fn moved(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let delta = match (self.held, self.last) {
            (true, Some((lx, ly))) => Some(((x - lx) as f32, (y - ly) as f32)),
            _ => None,
        };
        self.last = Some((x, y));
        delta
    }
}

fn log_notice(notice: Notice) {
    match notice {
        Notice::PlaybackChanged { playing } => log::info!("[audio] playing={playing}"),
        Notice::PlaybackEnded => log::info!("[audio] playback ended"),
        Notice::ControlEnabled(enabled) => log::debug!("[ui] controls enabled={enabled}"),
        Notice::DecodeFailed(msg) => log::error!("[load] could not decode: {msg}"),
        Notice::PlayRejected => log::warn!("[audio] nothing loaded to play"),
        Notice::PlaybackFailed(msg) => log::error!("[audio] {msg}"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = VisualizerConfig {
        initial_volume: args.volume,
        ..VisualizerConfig::default()
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("audiofield")
        .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0))
        .build(&event_loop)?;
    let size = window.inner_size();
    let viewport = Viewport::new(size.width, size.height);

    let source = CpalSource::new(Analyser::new(config.fft_size));
    let mut scheduler = FrameScheduler::new(source, &config, viewport);
    let mailbox = scheduler.mailbox();

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(&window)?;
    let mut renderer = pollster::block_on(GpuRenderer::new(
        &instance,
        surface,
        viewport,
        scheduler.context().layers.wave.indices(),
    ))?;

    if let Some(section) = &args.section {
        mailbox.post(Message::SectionChanged(SectionId::new(section.as_str())));
    }
    if let Some(path) = &args.file {
        load_file(path, &mailbox);
    }

    let window = &window;
    let start = Instant::now();
    let mut drag = MouseDrag::default();
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => mailbox.post(Message::Resize {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => handle_key(&logical_key, scheduler.source().volume(), &mailbox),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => drag.press(state == ElementState::Pressed),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((dx, dy)) = drag.moved(position.x, position.y) {
                    mailbox.post(Message::OrbitDrag { dx, dy });
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            scheduler.tick(start.elapsed().as_secs_f64(), &mut renderer);
            for notice in scheduler.drain_notices() {
                log_notice(notice);
            }
            window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_deltas_only_while_held() {
        let mut drag = MouseDrag::default();
        assert_eq!(drag.moved(10.0, 10.0), None);
        drag.press(true);
        assert_eq!(drag.moved(14.0, 7.0), Some((4.0, -3.0)));
        assert_eq!(drag.moved(15.0, 7.0), Some((1.0, 0.0)));
        drag.press(false);
        assert_eq!(drag.moved(40.0, 40.0), None);
    }
}
