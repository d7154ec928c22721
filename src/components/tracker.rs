use log::{debug, info, warn};
use serde::Serialize;
use url::Url;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAnchorElement};

use crate::dom;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = gtag, catch)]
    fn gtag(command: &str, action: &str, params: JsValue) -> Result<(), JsValue>;
}

const MESSAGING_HOSTS: &[&str] = &["wa.me"];

/// The parts of a clicked link or button the tracker looks at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClickTarget {
    pub href: Option<String>,
    pub classes: Vec<String>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackedEvent {
    pub category: &'static str,
    pub action: &'static str,
    pub label: String,
}

#[derive(Serialize)]
struct GtagParams<'a> {
    event_category: &'a str,
    event_label: &'a str,
}

pub trait AnalyticsSink {
    fn send(&self, event: &TrackedEvent);
}

/// Reports to Google Analytics when its `gtag` global is loaded, and to the
/// console either way.
pub struct GtagSink;

impl AnalyticsSink for GtagSink {
    fn send(&self, event: &TrackedEvent) {
        info!("Event tracked: {} / {} / {}", event.category, event.action, event.label);
        if !dom::has_global("gtag") {
            return;
        }
        let params = GtagParams {
            event_category: event.category,
            event_label: &event.label,
        };
        let Ok(params) = serde_wasm_bindgen::to_value(&params) else {
            return;
        };
        if let Err(err) = gtag("event", event.action, params) {
            warn!("gtag call failed: {:?}", err);
        }
    }
}

impl ClickTarget {
    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn is_apply_control(&self) -> bool {
        self.has_class("sticky-apply")
            || (self.has_class("btn-primary") && self.text.contains("Apply"))
    }
}

fn parsed_href(href: &str) -> Option<Url> {
    Url::parse(href).ok()
}

/// Match a click against the tracked patterns, first match wins.
pub fn classify(target: &ClickTarget) -> Option<TrackedEvent> {
    if let Some(href) = target.href.as_deref() {
        let url = parsed_href(href);
        let host = url.as_ref().and_then(|u| u.host_str());
        if host.map_or(false, |h| MESSAGING_HOSTS.contains(&h)) {
            return Some(TrackedEvent {
                category: "Contact",
                action: "WhatsApp Click",
                label: href.to_string(),
            });
        }
        if url.as_ref().map_or(false, |u| u.scheme() == "tel") {
            return Some(TrackedEvent {
                category: "Contact",
                action: "Phone Click",
                label: href.to_string(),
            });
        }
    }
    if target.is_apply_control() {
        return Some(TrackedEvent {
            category: "Conversion",
            action: "Apply Button Click",
            label: target.text.clone(),
        });
    }
    None
}

fn describe(element: &Element) -> ClickTarget {
    let href = match element.dyn_ref::<HtmlAnchorElement>() {
        Some(anchor) => Some(anchor.href()).filter(|h| !h.is_empty()),
        None => None,
    };
    ClickTarget {
        href,
        classes: element
            .class_name()
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        text: element.text_content().unwrap_or_default(),
    }
}

pub fn init(document: &Document, sink: impl AnalyticsSink + 'static) {
    dom::listen(document, "click", move |event| {
        let Some(element) = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("a, button").ok().flatten())
        else {
            return;
        };
        if let Some(tracked) = classify(&describe(&element)) {
            sink.send(&tracked);
        }
    });
    debug!("Click tracking bound");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str) -> ClickTarget {
        ClickTarget {
            href: Some(href.to_string()),
            ..ClickTarget::default()
        }
    }

    #[test]
    fn whatsapp_links_are_contacts() {
        let event = classify(&link("https://wa.me/48600100200?text=Hi")).unwrap();
        assert_eq!(event.category, "Contact");
        assert_eq!(event.action, "WhatsApp Click");
        assert_eq!(event.label, "https://wa.me/48600100200?text=Hi");
    }

    #[test]
    fn phone_links_are_contacts() {
        let event = classify(&link("tel:+48600100200")).unwrap();
        assert_eq!(event.action, "Phone Click");
        assert_eq!(event.label, "tel:+48600100200");
    }

    #[test]
    fn apply_controls_are_conversions() {
        let sticky = ClickTarget {
            classes: vec!["sticky-apply".into()],
            text: "Apply now".into(),
            ..ClickTarget::default()
        };
        let primary = ClickTarget {
            classes: vec!["btn".into(), "btn-primary".into()],
            text: "Apply for this job".into(),
            ..ClickTarget::default()
        };
        assert_eq!(classify(&sticky).unwrap().label, "Apply now");
        assert_eq!(classify(&primary).unwrap().action, "Apply Button Click");
    }

    #[test]
    fn ordinary_clicks_are_ignored() {
        assert_eq!(classify(&link("https://example.com/wa.me")), None);
        assert_eq!(classify(&link("#jobs")), None);
        let other_primary = ClickTarget {
            classes: vec!["btn-primary".into()],
            text: "Read more".into(),
            ..ClickTarget::default()
        };
        assert_eq!(classify(&other_primary), None);
    }
}
