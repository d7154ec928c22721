use std::rc::Rc;

use log::info;
use web_sys::Window;

use crate::dom;

/// Page-lifecycle extension points. Everything defaults to doing nothing.
pub trait ExtensionHooks {
    /// Runs on window `load` when the browser supports service workers.
    fn on_load(&self) {}
    fn on_online(&self) {}
    fn on_offline(&self) {}
}

/// Logs connectivity changes and registers no service worker.
pub struct ConsoleHooks;

impl ExtensionHooks for ConsoleHooks {
    fn on_online(&self) {
        info!("Connection restored");
    }

    fn on_offline(&self) {
        info!("Connection lost");
    }
}

/// Route a window event name to its hook. Returns false for other events.
pub fn dispatch(hooks: &dyn ExtensionHooks, event: &str) -> bool {
    match event {
        "load" => hooks.on_load(),
        "online" => hooks.on_online(),
        "offline" => hooks.on_offline(),
        _ => return false,
    }
    true
}

pub fn init(window: &Window, hooks: Rc<dyn ExtensionHooks>) {
    let mut events = vec!["online", "offline"];
    if js_sys::Reflect::has(&window.navigator(), &"serviceWorker".into()).unwrap_or(false) {
        events.push("load");
    }
    for event in events {
        let hooks = hooks.clone();
        dom::listen(window, event, move |_| {
            dispatch(hooks.as_ref(), event);
        });
    }
}
