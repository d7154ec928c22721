use log::Level;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while running under `trunk serve`
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Selectors for one group of mutually exclusive panels.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelGroupConfig {
    pub name: &'static str,
    pub panel_selector: &'static str,
    pub header_selector: &'static str,
    /// Panels are grouped by their closest ancestor matching this selector.
    /// `None` puts every matching panel in the document into one group.
    pub container_selector: Option<&'static str>,
    pub scroll_on_open: bool,
}

/// Every selector, key and timing the page components depend on.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub nav_toggle_id: &'static str,
    pub nav_id: &'static str,
    pub nav_link_selector: &'static str,
    pub active_class: &'static str,

    pub cards: PanelGroupConfig,
    pub accordions: PanelGroupConfig,
    pub panel_scroll_delay_ms: u32,

    pub reveal_selector: &'static str,
    pub reveal_class: &'static str,
    pub reveal_root_margin: &'static str,
    pub reveal_threshold: f64,
    pub reveal_stagger_ms: u32,

    pub anchor_selector: &'static str,
    pub anchor_header_selector: &'static str,
    pub anchor_gap_px: f64,

    pub header_id: &'static str,
    pub shadow_threshold_px: f64,
    pub shadow_scrolled: &'static str,
    pub shadow_resting: &'static str,

    pub form_id: &'static str,
    pub modal_id: &'static str,
    pub close_modal_id: &'static str,
    pub applications_key: &'static str,

    pub slide_selector: &'static str,
    pub slide_interval_ms: u32,
    pub zoom_delay_ms: u32,
    pub slide_reset_transform: &'static str,
    pub zoom_class: &'static str,

    pub lazy_image_selector: &'static str,
    pub lazy_image_root_margin: &'static str,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            nav_toggle_id: "navToggle",
            nav_id: "nav",
            nav_link_selector: ".nav-link",
            active_class: "active",

            cards: PanelGroupConfig {
                name: "country cards",
                panel_selector: ".country-card",
                header_selector: ".country-header",
                container_selector: None,
                scroll_on_open: true,
            },
            accordions: PanelGroupConfig {
                name: "accordions",
                panel_selector: ".accordion-item",
                header_selector: ".accordion-header",
                container_selector: Some(".accordion"),
                scroll_on_open: false,
            },
            panel_scroll_delay_ms: 100,

            reveal_selector: ".slide-up",
            reveal_class: "visible",
            reveal_root_margin: "0px 0px -50px 0px",
            reveal_threshold: 0.1,
            reveal_stagger_ms: 100,

            anchor_selector: "a[href^=\"#\"]",
            anchor_header_selector: ".header",
            anchor_gap_px: 20.0,

            header_id: "header",
            shadow_threshold_px: 10.0,
            shadow_scrolled: "0 2px 10px rgba(0, 0, 0, 0.1)",
            shadow_resting: "0 1px 2px rgba(0, 0, 0, 0.05)",

            form_id: "applyForm",
            modal_id: "successModal",
            close_modal_id: "closeModal",
            applications_key: "biscyne_applications",

            slide_selector: ".hero-slideshow .slide",
            slide_interval_ms: 6000,
            zoom_delay_ms: 100,
            slide_reset_transform: "scale(1.1)",
            zoom_class: "zoom",

            lazy_image_selector: "img[data-src]",
            lazy_image_root_margin: "50px 0px",
        }
    }
}
