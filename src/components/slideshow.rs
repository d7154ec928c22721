use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

use crate::config::SiteConfig;
use crate::dom;

static BACKGROUND_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(["']?(.+?)["']?\)"#).unwrap());

/// Index of the active hero slide, advanced only by the timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slideshow {
    current: usize,
    count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlideStep {
    pub previous: usize,
    pub next: usize,
}

impl Slideshow {
    pub fn new(count: usize) -> Option<Self> {
        (count > 0).then_some(Self { current: 0, count })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn advance(&mut self) -> SlideStep {
        let previous = self.current;
        self.current = (self.current + 1) % self.count;
        SlideStep {
            previous,
            next: self.current,
        }
    }
}

/// Image URL out of a `background-image` value such as `url("a.jpg")`.
pub fn background_url(style: &str) -> Option<&str> {
    BACKGROUND_URL
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
}

fn preload(slides: &[Element]) {
    for slide in slides {
        let Some(html) = slide.dyn_ref::<HtmlElement>() else {
            continue;
        };
        let Ok(style) = html.style().get_property_value("background-image") else {
            continue;
        };
        let Some(url) = background_url(&style) else {
            continue;
        };
        match HtmlImageElement::new() {
            Ok(img) => img.set_src(url),
            Err(err) => warn!("Could not preload {}: {:?}", url, err),
        }
    }
}

fn zoom_later(slide: &Element, zoom_class: &'static str, delay_ms: u32) {
    let slide = slide.clone();
    Timeout::new(delay_ms, move || dom::add_class(&slide, zoom_class)).forget();
}

pub fn init(document: &Document, config: &SiteConfig) {
    let slides = dom::query_all(document, config.slide_selector);
    let Some(show) = Slideshow::new(slides.len()) else {
        debug!("No hero slides");
        return;
    };
    let active_class = config.active_class;
    let zoom_class = config.zoom_class;
    let zoom_delay = config.zoom_delay_ms;
    let reset_transform = config.slide_reset_transform;

    zoom_later(&slides[show.current()], zoom_class, zoom_delay);

    let state = Rc::new(RefCell::new(show));
    let timer_slides = slides.clone();
    Interval::new(config.slide_interval_ms, move || {
        let step = state.borrow_mut().advance();
        let previous = &timer_slides[step.previous];
        let next = &timer_slides[step.next];

        let _ = previous.class_list().remove_2(active_class, zoom_class);
        dom::set_style(next, "transform", reset_transform);
        // Reading layout flushes the transform reset before the slide activates.
        if let Some(html) = next.dyn_ref::<HtmlElement>() {
            let _ = html.offset_height();
        }
        dom::add_class(next, active_class);
        zoom_later(next, zoom_class, zoom_delay);
    })
    .forget();

    preload(&slides);
    debug!("Hero slideshow running over {} slides", slides.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_and_wraps() {
        let mut show = Slideshow::new(3).unwrap();
        assert_eq!(show.current(), 0);
        assert_eq!(show.advance(), SlideStep { previous: 0, next: 1 });
        show.advance();
        assert_eq!(show.advance(), SlideStep { previous: 2, next: 0 });
        assert_eq!(show.current(), 0);
    }

    #[test]
    fn single_slide_stays_put() {
        let mut show = Slideshow::new(1).unwrap();
        assert_eq!(show.advance(), SlideStep { previous: 0, next: 0 });
    }

    #[test]
    fn no_slides_no_show() {
        assert!(Slideshow::new(0).is_none());
    }

    #[test]
    fn extracts_background_urls() {
        assert_eq!(background_url(r#"url("img/hero-1.jpg")"#), Some("img/hero-1.jpg"));
        assert_eq!(background_url("url('img/hero 2.webp')"), Some("img/hero 2.webp"));
        assert_eq!(background_url("url(img/hero-3.jpg)"), Some("img/hero-3.jpg"));
        assert_eq!(background_url("none"), None);
    }
}
