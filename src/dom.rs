use js_sys::{Array, Reflect};
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, NodeList, Window,
};

pub fn window() -> Option<Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

/// True when `name` is defined on the global object.
pub fn has_global(name: &str) -> bool {
    Reflect::has(&js_sys::global(), &JsValue::from_str(name)).unwrap_or(false)
}

/// How elements waiting on viewport entry are handled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntryStrategy {
    Observe,
    /// No IntersectionObserver: act on every element at once.
    Immediate,
}

impl EntryStrategy {
    pub fn for_support(observer_supported: bool) -> Self {
        if observer_supported {
            EntryStrategy::Observe
        } else {
            EntryStrategy::Immediate
        }
    }

    pub fn detect() -> Self {
        Self::for_support(has_global("IntersectionObserver"))
    }
}

fn elements_of(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => elements_of(list),
        Err(err) => {
            warn!("Bad selector {}: {:?}", selector, err);
            Vec::new()
        }
    }
}

pub fn query_all_in(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(elements_of)
        .unwrap_or_default()
}

/// Attach `handler` for the rest of the page's life. Listeners are never
/// removed, so the closure is leaked on purpose.
pub fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    if let Err(err) =
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
    {
        warn!("Failed to attach {} listener: {:?}", event, err);
    }
    callback.forget();
}

pub fn listen_passive(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        callback.as_ref().unchecked_ref(),
        &options,
    ) {
        warn!("Failed to attach passive {} listener: {:?}", event, err);
    }
    callback.forget();
}

pub fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

pub fn add_class(element: &Element, class: &str) {
    let _ = element.class_list().add_1(class);
}

pub fn remove_class(element: &Element, class: &str) {
    let _ = element.class_list().remove_1(class);
}

/// Observe `targets` and call `on_enter` the first time each one intersects
/// the viewport. A target is unobserved right after its first intersection.
pub fn observe_first_intersection(
    targets: &[Element],
    root_margin: &str,
    threshold: Option<f64>,
    mut on_enter: impl FnMut(&Element) + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if !entry.is_intersecting() {
                continue;
            }
            let target = entry.target();
            on_enter(&target);
            observer.unobserve(&target);
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let init = IntersectionObserverInit::new();
    init.set_root_margin(root_margin);
    if let Some(threshold) = threshold {
        init.set_threshold(&JsValue::from_f64(threshold));
    }

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for target in targets {
        observer.observe(target);
    }
    callback.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_observer_means_immediate() {
        assert_eq!(EntryStrategy::for_support(true), EntryStrategy::Observe);
        assert_eq!(EntryStrategy::for_support(false), EntryStrategy::Immediate);
    }
}
