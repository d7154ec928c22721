use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

use crate::config::SiteConfig;
use crate::dom;

/// Lets at most one frame callback be pending. Scroll events that arrive
/// while one is pending are dropped.
#[derive(Debug, Default)]
pub struct FrameGate {
    pending: Cell<bool>,
}

impl FrameGate {
    /// True if the caller should schedule a frame.
    pub fn request(&self) -> bool {
        !self.pending.replace(true)
    }

    pub fn release(&self) {
        self.pending.set(false);
    }
}

pub fn shadow_for<'a>(offset: f64, threshold: f64, scrolled: &'a str, resting: &'a str) -> &'a str {
    if offset > threshold {
        scrolled
    } else {
        resting
    }
}

pub fn init(window: &Window, document: &Document, config: &SiteConfig) {
    let Some(header) = document.get_element_by_id(config.header_id) else {
        debug!("No #{} element, header shadow disabled", config.header_id);
        return;
    };

    let gate = Rc::new(FrameGate::default());
    let threshold = config.shadow_threshold_px;
    let scrolled = config.shadow_scrolled;
    let resting = config.shadow_resting;

    let on_frame = {
        let gate = gate.clone();
        let window = window.clone();
        Closure::wrap(Box::new(move || {
            let offset = window.scroll_y().unwrap_or(0.0);
            dom::set_style(&header, "box-shadow", shadow_for(offset, threshold, scrolled, resting));
            gate.release();
        }) as Box<dyn FnMut()>)
    };

    let frame_window = window.clone();
    dom::listen_passive(window, "scroll", move |_| {
        if !gate.request() {
            return;
        }
        if let Err(err) = frame_window.request_animation_frame(on_frame.as_ref().unchecked_ref()) {
            warn!("requestAnimationFrame failed: {:?}", err);
            gate.release();
        }
    });
    debug!("Header shadow bound");
}
