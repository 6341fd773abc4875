#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;

use audiofield_core::{FrameScheduler, Viewport, VisualizerConfig};
use audiofield_render::GpuRenderer;
use instant::Instant;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod canvas;
mod dom;
mod events;
mod format;
mod frame;

use audio::WebAudioSource;
use events::Surfaces;
use frame::FrameContext;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("audiofield-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

fn scene_canvas(document: &web::Document) -> anyhow::Result<web::HtmlCanvasElement> {
    let container: web::HtmlElement = dom::element_by_id(document, "three-container")?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{e:?}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    canvas
        .set_attribute(
            "style",
            "width:100%;height:100%;display:block;touch-action:none",
        )
        .ok();
    container
        .append_child(&canvas)
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    Ok(canvas)
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let surfaces = Rc::new(Surfaces {
        scene: scene_canvas(&document)?,
        panel_box: document
            .query_selector(".visualization-container")
            .map_err(|e| anyhow::anyhow!("{e:?}"))?
            .ok_or_else(|| anyhow::anyhow!("missing .visualization-container"))?
            .dyn_into::<web::HtmlElement>()
            .map_err(|e| anyhow::anyhow!("{e:?}"))?,
        waveform: dom::element_by_id(&document, "waveform")?,
        spectrum: dom::element_by_id(&document, "frequency")?,
    });
    let (width, height) = dom::sync_canvas_backing_size(&surfaces.scene);
    let viewport = Viewport::new(width, height);

    let config = VisualizerConfig::default();
    let source = WebAudioSource::new()?;
    let audio_ctx = source.context().clone();
    let scheduler = FrameScheduler::new(source, &config, viewport);
    let mailbox = scheduler.mailbox();

    let play_button: web::HtmlButtonElement = dom::element_by_id(&document, "play-pause")?;
    play_button.set_disabled(true);
    let volume: web::HtmlInputElement = dom::element_by_id(&document, "volume")?;
    volume.set_value(&config.initial_volume.to_string());
    let file_input: web::HtmlInputElement = dom::element_by_id(&document, "audio-file")?;

    events::wire_file_input(&file_input, mailbox.clone(), audio_ctx);
    events::wire_play_pause(&play_button, mailbox.clone());
    events::wire_volume(&volume, mailbox.clone());
    if let Err(e) = events::wire_sections(&document, mailbox.clone()) {
        log::warn!("[sections] disabled: {e}");
    }
    events::wire_orbit_drag(&surfaces.scene, mailbox.clone());
    events::wire_resize(surfaces.clone(), mailbox.clone());
    surfaces.post_sizes(&mailbox);

    let instance = wgpu::Instance::default();
    let gpu = match instance.create_surface(wgpu::SurfaceTarget::Canvas(surfaces.scene.clone())) {
        Ok(surface) => {
            match GpuRenderer::new(&instance, surface, viewport, scheduler.context().layers.wave.indices()).await {
                Ok(gpu) => Some(gpu),
                Err(e) => {
                    log::error!("[render] GPU init failed, 3D scene disabled: {e:?}");
                    None
                }
            }
        }
        Err(e) => {
            log::error!("[render] surface error: {e:?}");
            None
        }
    };

    let ctx = Rc::new(RefCell::new(FrameContext {
        scheduler,
        gpu,
        waveform_ctx: dom::context_2d(&surfaces.waveform)?,
        spectrum_ctx: dom::context_2d(&surfaces.spectrum)?,
        play_button,
        started: Instant::now(),
    }));

    // requestAnimationFrame loop
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        ctx.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
    Ok(())
}
