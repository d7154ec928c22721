use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::debug;
use web_sys::{Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

use crate::config::{PanelGroupConfig, SiteConfig};
use crate::dom;

/// A set of sibling panels of which at most one is expanded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelGroup {
    len: usize,
    expanded: Option<usize>,
}

/// What a header click changed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanelChange {
    pub collapsed: Option<usize>,
    pub expanded: Option<usize>,
}

impl PanelGroup {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            expanded: None,
        }
    }

    /// Start with `expanded` open, ignoring an out of range index.
    pub fn with_expanded(len: usize, expanded: Option<usize>) -> Self {
        Self {
            len,
            expanded: expanded.filter(|&i| i < len),
        }
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    /// Close whichever other panel is open and flip `index`.
    pub fn toggle(&mut self, index: usize) -> PanelChange {
        if index >= self.len {
            return PanelChange::default();
        }
        match self.expanded {
            Some(open) if open == index => {
                self.expanded = None;
                PanelChange {
                    collapsed: Some(open),
                    expanded: None,
                }
            }
            previous => {
                self.expanded = Some(index);
                PanelChange {
                    collapsed: previous,
                    expanded: Some(index),
                }
            }
        }
    }
}

fn scroll_into_nearest(element: &Element) {
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Nearest);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

/// Split panels into groups keyed by their closest container, keeping
/// document order inside each group.
fn partition(panels: Vec<Element>, container_selector: Option<&str>) -> Vec<Vec<Element>> {
    let Some(selector) = container_selector else {
        return vec![panels];
    };
    let mut groups: Vec<(Option<Element>, Vec<Element>)> = Vec::new();
    for panel in panels {
        let container = panel.closest(selector).ok().flatten();
        match groups.iter_mut().find(|(key, _)| *key == container) {
            Some((_, members)) => members.push(panel),
            None => groups.push((container, vec![panel])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

fn bind_group(
    panels: Vec<Element>,
    group: &PanelGroupConfig,
    active_class: &'static str,
    scroll_delay_ms: u32,
) {
    let initially_open = panels
        .iter()
        .position(|p| p.class_list().contains(active_class));

    let state = Rc::new(RefCell::new(PanelGroup::with_expanded(
        panels.len(),
        initially_open,
    )));
    let panels = Rc::new(panels);
    let scroll_on_open = group.scroll_on_open;

    for (index, panel) in panels.iter().enumerate() {
        let Some(header) = panel.query_selector(group.header_selector).ok().flatten() else {
            continue;
        };
        let state = state.clone();
        let panels = panels.clone();
        dom::listen(&header, "click", move |_| {
            let change = state.borrow_mut().toggle(index);
            if let Some(closed) = change.collapsed {
                dom::remove_class(&panels[closed], active_class);
            }
            if let Some(opened) = change.expanded {
                let panel = panels[opened].clone();
                dom::add_class(&panel, active_class);
                if scroll_on_open {
                    Timeout::new(scroll_delay_ms, move || scroll_into_nearest(&panel)).forget();
                }
            }
        });
    }
}

fn init_group(document: &Document, group: &PanelGroupConfig, config: &SiteConfig) {
    let panels = dom::query_all(document, group.panel_selector);
    if panels.is_empty() {
        debug!("No {} on page", group.name);
        return;
    }
    let groups = partition(panels, group.container_selector);
    debug!("Binding {} group(s) of {}", groups.len(), group.name);
    for members in groups {
        bind_group(members, group, config.active_class, config.panel_scroll_delay_ms);
    }
}

pub fn init(document: &Document, config: &SiteConfig) {
    init_group(document, &config.cards, config);
    init_group(document, &config.accordions, config);
}
