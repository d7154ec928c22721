use log::{debug, warn};
use web_sys::{Document, Element};

use crate::config::SiteConfig;
use crate::dom;

const DATA_SRC: &str = "data-src";

/// The deferred source to load, if the attribute holds one.
pub fn deferred_source(data_src: Option<String>) -> Option<String> {
    data_src.filter(|src| !src.trim().is_empty())
}

fn load(img: &Element) {
    if let Some(src) = deferred_source(img.get_attribute(DATA_SRC)) {
        let _ = img.set_attribute("src", &src);
    }
    let _ = img.remove_attribute(DATA_SRC);
}

pub fn init(document: &Document, config: &SiteConfig) {
    let images = dom::query_all(document, config.lazy_image_selector);
    if images.is_empty() {
        return;
    }
    if dom::EntryStrategy::detect() == dom::EntryStrategy::Immediate {
        images.iter().for_each(load);
        return;
    }
    match dom::observe_first_intersection(&images, config.lazy_image_root_margin, None, load) {
        Ok(()) => debug!("Lazy loading {} images", images.len()),
        Err(err) => {
            warn!("Lazy image observer failed, loading eagerly: {:?}", err);
            images.iter().for_each(load);
        }
    }
}
