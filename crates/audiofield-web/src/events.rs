//! DOM callbacks. Every handler only posts into the scheduler's mailbox; the
//! frame loop applies the messages at the start of the next tick.

use std::cell::Cell;
use std::rc::Rc;

use audiofield_core::{Mailbox, Message, PanelSize, SectionId};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use crate::audio;
use crate::dom;
use crate::format;

pub type WebMailbox = Mailbox<web::AudioBuffer>;

const SECTION_THRESHOLD: f64 = 0.5;

/// `#audio-file` change: issue a ticket, decode off the frame loop, deliver.
pub fn wire_file_input(
    input: &web::HtmlInputElement,
    mailbox: WebMailbox,
    audio_ctx: web::AudioContext,
) {
    let input_ref = input.clone();
    dom::listen(input, "change", move |_| {
        let Some(file) = input_ref.files().and_then(|list| list.get(0)) else {
            return;
        };
        let ticket = mailbox.begin_load();
        log::info!("[load] reading {} ({} bytes)", file.name(), file.size());
        let mailbox = mailbox.clone();
        let ctx = audio_ctx.clone();
        spawn_local(async move {
            let result = audio::decode_file(ctx, file).await;
            if let Err(e) = &result {
                log::warn!("[load] {e}");
            }
            mailbox.deliver_decoded(ticket, result);
        });
    });
}

pub fn wire_play_pause(button: &web::HtmlButtonElement, mailbox: WebMailbox) {
    dom::listen(button, "click", move |_| {
        mailbox.post(Message::TogglePlayback);
    });
}

pub fn wire_volume(slider: &web::HtmlInputElement, mailbox: WebMailbox) {
    let slider_ref = slider.clone();
    dom::listen(slider, "input", move |_| {
        if let Some(v) = format::parse_volume(&slider_ref.value()) {
            mailbox.post(Message::SetVolume(v));
        }
    });
}

/// Observes every `.section`; the most visible one past half coverage
/// becomes the current section.
pub fn wire_sections(document: &web::Document, mailbox: WebMailbox) -> anyhow::Result<()> {
    let callback = Closure::wrap(Box::new(move |entries: js_sys::Array| {
        let records: Vec<(String, bool, f64)> = entries
            .iter()
            .filter_map(|v| v.dyn_into::<web::IntersectionObserverEntry>().ok())
            .map(|e| (e.target().id(), e.is_intersecting(), e.intersection_ratio()))
            .collect();
        let winner = format::dominant_section(
            records.iter().map(|(id, hit, ratio)| (id.as_str(), *hit, *ratio)),
        );
        if let Some(id) = winner {
            mailbox.post(Message::SectionChanged(SectionId::from(id)));
        }
    }) as Box<dyn FnMut(js_sys::Array)>);

    let init = web::IntersectionObserverInit::new();
    init.set_threshold(&wasm_bindgen::JsValue::from_f64(SECTION_THRESHOLD));
    let observer =
        web::IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            .map_err(|e| anyhow::anyhow!("IntersectionObserver: {e:?}"))?;
    callback.forget();

    let sections = document
        .query_selector_all(".section")
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    for i in 0..sections.length() {
        if let Some(el) = sections.item(i).and_then(|n| n.dyn_into::<web::Element>().ok()) {
            observer.observe(&el);
        }
    }
    log::info!("[sections] observing {} sections", sections.length());
    Ok(())
}

#[derive(Default, Clone, Copy)]
struct DragState {
    active: bool,
    x: f32,
    y: f32,
}

/// Pointer drags on the scene canvas orbit the camera. Positions are in
/// backing-store pixels, the same space as the viewport.
pub fn wire_orbit_drag(canvas: &web::HtmlCanvasElement, mailbox: WebMailbox) {
    let drag = Rc::new(Cell::new(DragState::default()));

    let (c, d) = (canvas.clone(), drag.clone());
    dom::listen(canvas, "pointerdown", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let [x, y] = dom::pointer_canvas_px(ev, &c);
        c.set_pointer_capture(ev.pointer_id()).ok();
        d.set(DragState { active: true, x, y });
    });

    let (c, d) = (canvas.clone(), drag.clone());
    dom::listen(canvas, "pointermove", move |ev| {
        let state = d.get();
        if !state.active {
            return;
        }
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let [x, y] = dom::pointer_canvas_px(ev, &c);
        mailbox.post(Message::OrbitDrag {
            dx: x - state.x,
            dy: y - state.y,
        });
        d.set(DragState { active: true, x, y });
    });

    for event in ["pointerup", "pointercancel"] {
        let d = drag.clone();
        dom::listen(canvas, event, move |_| d.set(DragState::default()));
    }
}

/// Canvases that follow the window size.
pub struct Surfaces {
    pub scene: web::HtmlCanvasElement,
    pub panel_box: web::HtmlElement,
    pub waveform: web::HtmlCanvasElement,
    pub spectrum: web::HtmlCanvasElement,
}

impl Surfaces {
    /// Re-syncs backing sizes and posts the resulting sizes.
    pub fn post_sizes(&self, mailbox: &WebMailbox) {
        let (w, h) = dom::sync_canvas_backing_size(&self.scene);
        mailbox.post(Message::Resize {
            width: w,
            height: h,
        });
        // Panels draw in CSS pixels, matching the container box.
        let pw = self.panel_box.client_width().max(0) as u32;
        let ph = self.panel_box.client_height().max(0) as u32;
        for canvas in [&self.waveform, &self.spectrum] {
            canvas.set_width(pw);
            canvas.set_height(ph);
        }
        let size = PanelSize::new(pw as f32, ph as f32);
        mailbox.post(Message::PanelsResized {
            waveform: size,
            spectrum: size,
        });
    }
}

pub fn wire_resize(surfaces: std::rc::Rc<Surfaces>, mailbox: WebMailbox) {
    let Some(window) = web::window() else {
        return;
    };
    dom::listen(&window, "resize", move |_| surfaces.post_sizes(&mailbox));
}
