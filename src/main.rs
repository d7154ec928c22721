use std::rc::Rc;

use log::{info, warn};
use web_sys::{Document, Window};

mod config;
mod dom;
mod storage;
mod components {
    pub mod anchor;
    pub mod apply_form;
    pub mod connectivity;
    pub mod header;
    pub mod lazy_images;
    pub mod nav;
    pub mod panels;
    pub mod reveal;
    pub mod slideshow;
    pub mod tracker;
}

use components::{
    anchor, apply_form, connectivity, header, lazy_images, nav, panels, reveal, slideshow, tracker,
};
use config::SiteConfig;

/// Bind every page component. Each one no-ops on its own when its markup is
/// missing, so the order here only fixes listener registration order.
fn init_all(window: &Window, document: &Document, config: &SiteConfig) {
    nav::init(document, config);
    panels::init(document, config);
    reveal::init(document, config);
    anchor::init(window, document, config);
    apply_form::init(window, document, config);
    header::init(window, document, config);
    slideshow::init(document, config);
    lazy_images::init(document, config);
    tracker::init(document, tracker::GtagSink);
    connectivity::init(window, Rc::new(connectivity::ConsoleHooks));
    info!("Page components ready");
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    let (Some(window), Some(document)) = (dom::window(), dom::document()) else {
        warn!("No window or document, nothing to bind");
        return;
    };
    let config = SiteConfig::default();

    if document.ready_state() == "loading" {
        let (win, doc) = (window.clone(), document.clone());
        dom::listen(&document, "DOMContentLoaded", move |_| {
            init_all(&win, &doc, &config);
        });
    } else {
        init_all(&window, &document, &config);
    }
}
