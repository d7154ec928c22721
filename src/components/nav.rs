use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

use crate::config::SiteConfig;
use crate::dom;

/// Open/closed state of the mobile menu.
#[derive(Debug, Default)]
pub struct NavMenu {
    open: Cell<bool>,
}

impl NavMenu {
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Flip the menu, returning the new state.
    pub fn toggle(&self) -> bool {
        let open = !self.open.get();
        self.open.set(open);
        open
    }

    /// Returns true if the menu was open.
    pub fn close(&self) -> bool {
        self.open.replace(false)
    }

    /// Close on a click that landed outside both the menu and its toggle.
    pub fn dismiss(&self, inside_nav: bool, inside_toggle: bool) -> bool {
        !inside_nav && !inside_toggle && self.close()
    }
}

fn render(menu: &NavMenu, toggle: &Element, nav: &Element, document: &Document, active_class: &str) {
    let body_overflow = if menu.is_open() {
        dom::add_class(toggle, active_class);
        dom::add_class(nav, active_class);
        "hidden"
    } else {
        dom::remove_class(toggle, active_class);
        dom::remove_class(nav, active_class);
        ""
    };
    if let Some(body) = document.body() {
        let _ = body.style().set_property("overflow", body_overflow);
    }
}

pub fn init(document: &Document, config: &SiteConfig) {
    let (Some(toggle), Some(nav)) = (
        document.get_element_by_id(config.nav_toggle_id),
        document.get_element_by_id(config.nav_id),
    ) else {
        debug!("Navigation toggle or menu missing, skipping");
        return;
    };
    let menu = Rc::new(NavMenu::default());
    let active_class = config.active_class;

    {
        let menu = menu.clone();
        let (toggle_el, nav_el, doc) = (toggle.clone(), nav.clone(), document.clone());
        dom::listen(&toggle, "click", move |_| {
            menu.toggle();
            render(&menu, &toggle_el, &nav_el, &doc, active_class);
        });
    }

    for link in dom::query_all(document, config.nav_link_selector) {
        let menu = menu.clone();
        let (toggle_el, nav_el, doc) = (toggle.clone(), nav.clone(), document.clone());
        dom::listen(&link, "click", move |_| {
            menu.close();
            render(&menu, &toggle_el, &nav_el, &doc, active_class);
        });
    }

    let doc = document.clone();
    dom::listen(document, "click", move |event| {
        if !menu.is_open() {
            return;
        }
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        let inside_nav = nav.contains(target.as_ref());
        let inside_toggle = toggle.contains(target.as_ref());
        if menu.dismiss(inside_nav, inside_toggle) {
            render(&menu, &toggle, &nav, &doc, active_class);
        }
    });
    debug!("Mobile navigation bound");
}
