use audiofield_core::{FrameScheduler, Notice, Renderer, Viewport, VisualizationContext};
use audiofield_render::GpuRenderer;
use instant::Instant;
use web_sys as web;

use crate::audio::WebAudioSource;
use crate::canvas;
use crate::format;

/// Stand-in while the GPU is unavailable; panels still animate.
struct NoGpu;

impl Renderer for NoGpu {
    fn resize(&mut self, _viewport: Viewport) {}
    fn render(&mut self, _ctx: &VisualizationContext) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct FrameContext {
    pub scheduler: FrameScheduler<WebAudioSource>,
    pub gpu: Option<GpuRenderer<'static>>,
    pub waveform_ctx: web::CanvasRenderingContext2d,
    pub spectrum_ctx: web::CanvasRenderingContext2d,
    pub play_button: web::HtmlButtonElement,
    pub started: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = self.started.elapsed().as_secs_f64();
        match self.gpu.as_mut() {
            Some(gpu) => self.scheduler.tick(now, gpu),
            None => self.scheduler.tick(now, &mut NoGpu),
        }

        let panels = &self.scheduler.context().panels;
        canvas::execute(&self.waveform_ctx, &panels.waveform);
        canvas::execute(&self.spectrum_ctx, &panels.spectrum);

        for notice in self.scheduler.drain_notices() {
            self.apply_notice(notice);
        }
    }

    fn apply_notice(&self, notice: Notice) {
        match notice {
            Notice::PlaybackChanged { playing } => {
                self.play_button.set_text_content(Some(format::play_label(playing)));
            }
            Notice::PlaybackEnded => log::info!("[audio] playback ended"),
            Notice::ControlEnabled(enabled) => self.play_button.set_disabled(!enabled),
            Notice::DecodeFailed(msg) => log::error!("[load] could not decode: {msg}"),
            Notice::PlayRejected => log::warn!("[audio] nothing loaded to play"),
            Notice::PlaybackFailed(msg) => {
                log::error!("[audio] {msg}");
                self.play_button.set_text_content(Some(format::play_label(false)));
            }
        }
    }
}
