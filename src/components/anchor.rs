use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::config::SiteConfig;
use crate::dom;

/// Element id an in-page link points at. Empty and bare `#` links are left
/// to the browser.
pub fn fragment_id(href: &str) -> Option<String> {
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    let id = urlencoding::decode(fragment)
        .map(|id| id.into_owned())
        .unwrap_or_else(|_| fragment.to_string());
    Some(id)
}

/// Document offset to scroll to so the target clears the fixed header.
pub fn scroll_top(target_top: f64, page_offset: f64, header_height: f64, gap: f64) -> f64 {
    target_top + page_offset - header_height - gap
}

fn header_height(document: &Document, selector: &str) -> f64 {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map_or(0.0, |header| header.offset_height() as f64)
}

pub fn init(window: &Window, document: &Document, config: &SiteConfig) {
    let links = dom::query_all(document, config.anchor_selector);
    debug!("Binding smooth scroll on {} anchor links", links.len());

    for link in links {
        let window = window.clone();
        let document = document.clone();
        let href_source = link.clone();
        let header_selector = config.anchor_header_selector;
        let gap = config.anchor_gap_px;

        dom::listen(&link, "click", move |event| {
            let Some(id) = href_source
                .get_attribute("href")
                .and_then(|href| fragment_id(&href))
            else {
                return;
            };
            let Some(target) = document.get_element_by_id(&id) else {
                return;
            };
            event.prevent_default();

            let top = scroll_top(
                target.get_bounding_client_rect().top(),
                window.page_y_offset().unwrap_or(0.0),
                header_height(&document, header_selector),
                gap,
            );
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_empty_fragments_pass_through() {
        assert_eq!(fragment_id(""), None);
        assert_eq!(fragment_id("#"), None);
        assert_eq!(fragment_id("/jobs#apply"), None);
    }

    #[test]
    fn fragment_is_decoded() {
        assert_eq!(fragment_id("#apply").as_deref(), Some("apply"));
        assert_eq!(fragment_id("#job%20list").as_deref(), Some("job list"));
    }

    #[test]
    fn offset_subtracts_header_and_gap() {
        assert_eq!(scroll_top(400.0, 1200.0, 80.0, 20.0), 1500.0);
        assert_eq!(scroll_top(-300.0, 1200.0, 64.0, 20.0), 816.0);
    }
}
