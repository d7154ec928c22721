use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, FormData, HtmlFormElement, KeyboardEvent, Window};

use crate::config::SiteConfig;
use crate::dom;
use crate::storage::{ApplicationLog, BrowserStore, KeyValueStore, StoreError};

// ASCII digits only; `\d` in `regex` would admit every Unicode digit.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9+\-]{10,15}$").unwrap()
});

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all required fields.")]
    MissingField(&'static str),
    #[error("Please enter a valid phone number.")]
    InvalidPhone,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Values read from the application form, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplicationForm {
    pub full_name: String,
    pub phone: String,
    pub job: String,
    pub country: String,
    pub extra: BTreeMap<String, String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub full_name: String,
    pub phone: String,
    pub job: String,
    pub country: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_PATTERN.is_match(&compact)
}

impl ApplicationForm {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut form = ApplicationForm::default();
        for (name, value) in pairs {
            match name.as_str() {
                "fullName" => form.full_name = value,
                "phone" => form.phone = value,
                "job" => form.job = value,
                "country" => form.country = value,
                // Would shadow the record's own timestamp when flattened.
                "timestamp" => {}
                _ => {
                    form.extra.insert(name, value);
                }
            }
        }
        form
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("job", &self.job),
            ("country", &self.country),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(ValidationError::MissingField(*name));
        }
        if !is_valid_phone(&self.phone) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(())
    }

    pub fn into_record(self, timestamp: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            full_name: self.full_name,
            phone: self.phone,
            job: self.job,
            country: self.country,
            extra: self.extra,
            timestamp,
        }
    }
}

/// Visibility of the confirmation overlay. Every close path is idempotent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Overlay {
    visible: bool,
}

impl Overlay {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Returns true if the overlay was open.
    pub fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }

    pub fn on_backdrop_click(&mut self, clicked_backdrop: bool) -> bool {
        clicked_backdrop && self.hide()
    }

    pub fn on_key(&mut self, key: &str) -> bool {
        key == "Escape" && self.hide()
    }
}

/// Validates submissions, records accepted ones and raises the overlay.
pub struct ApplicationDesk<S> {
    log: ApplicationLog<S>,
    overlay: Overlay,
}

impl<S: KeyValueStore> ApplicationDesk<S> {
    pub fn new(log: ApplicationLog<S>) -> Self {
        Self {
            log,
            overlay: Overlay::default(),
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    pub fn submit(
        &mut self,
        form: ApplicationForm,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, FormError> {
        form.validate()?;
        let record = form.into_record(now);
        self.log.append(&record)?;
        self.overlay.show();
        Ok(record)
    }

    #[cfg(test)]
    pub fn log(&self) -> &ApplicationLog<S> {
        &self.log
    }
}

/// The application record holds text only, so file inputs are dropped.
fn text_entry(name: String, value: Option<String>) -> Option<(String, String)> {
    match value {
        Some(value) => Some((name, value)),
        None => {
            debug!("Skipping non-text form field {}", name);
            None
        }
    }
}

fn read_form(form: &HtmlFormElement) -> ApplicationForm {
    let Ok(data) = FormData::new_with_form(form) else {
        return ApplicationForm::default();
    };
    let pairs = js_sys::try_iter(&data)
        .ok()
        .flatten()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let pair: js_sys::Array = entry.dyn_into().ok()?;
            text_entry(pair.get(0).as_string()?, pair.get(1).as_string())
        });
    ApplicationForm::from_pairs(pairs)
}

fn sync_overlay(modal: Option<&Element>, overlay: &Overlay, active_class: &str) {
    if let Some(modal) = modal {
        if overlay.is_visible() {
            dom::add_class(modal, active_class);
        } else {
            dom::remove_class(modal, active_class);
        }
    }
}

pub fn init(window: &Window, document: &Document, config: &SiteConfig) {
    let Some(form) = document
        .get_element_by_id(config.form_id)
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        debug!("No application form, skipping form handler");
        return;
    };
    let storage = BrowserStore::from_window(window);
    if !storage.is_available() {
        warn!("Local storage unavailable, applications will be rejected on submit");
    }

    let modal = document.get_element_by_id(config.modal_id);
    let close_button = document.get_element_by_id(config.close_modal_id);
    let active_class = config.active_class;
    let desk = Rc::new(RefCell::new(ApplicationDesk::new(ApplicationLog::new(
        storage,
        config.applications_key,
    ))));

    {
        let desk = desk.clone();
        let modal = modal.clone();
        let window = window.clone();
        let form_el = form.clone();
        dom::listen(&form, "submit", move |event| {
            event.prevent_default();
            let fields = read_form(&form_el);
            let result = desk.borrow_mut().submit(fields, Utc::now());
            match result {
                Ok(record) => {
                    info!("Form submitted for {}", record.job);
                    if let Ok(value) = serde_wasm_bindgen::to_value(&record) {
                        gloo_console::log!("Form submitted:", value);
                    }
                    sync_overlay(modal.as_ref(), desk.borrow().overlay(), active_class);
                    form_el.reset();
                }
                Err(FormError::Invalid(err)) => {
                    debug!("Rejected application: {:?}", err);
                    let _ = window.alert_with_message(&err.to_string());
                }
                Err(FormError::Store(err)) => {
                    error!("Could not store application: {}", err);
                }
            }
        });
    }

    let (Some(modal), Some(close_button)) = (modal, close_button) else {
        debug!("Form bound without confirmation overlay controls");
        return;
    };
    {
        let desk = desk.clone();
        let modal = modal.clone();
        dom::listen(&close_button, "click", move |_| {
            desk.borrow_mut().overlay_mut().hide();
            sync_overlay(Some(&modal), desk.borrow().overlay(), active_class);
        });
    }

    {
        let desk = desk.clone();
        let backdrop = modal.clone();
        dom::listen(&modal, "click", move |event| {
            let clicked_backdrop = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .map_or(false, |el| el == backdrop);
            if desk.borrow_mut().overlay_mut().on_backdrop_click(clicked_backdrop) {
                sync_overlay(Some(&backdrop), desk.borrow().overlay(), active_class);
            }
        });
    }

    dom::listen(document, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|e| e.key()) else {
            return;
        };
        if desk.borrow_mut().overlay_mut().on_key(&key) {
            sync_overlay(Some(&modal), desk.borrow().overlay(), active_class);
        }
    });

    debug!("Application form bound");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn pairs(full_name: &str, phone: &str, job: &str, country: &str) -> ApplicationForm {
        ApplicationForm::from_pairs(vec![
            ("fullName".to_string(), full_name.to_string()),
            ("phone".to_string(), phone.to_string()),
            ("job".to_string(), job.to_string()),
            ("country".to_string(), country.to_string()),
            ("message".to_string(), "available from May".to_string()),
        ])
    }

    fn desk() -> ApplicationDesk<MemoryStore> {
        ApplicationDesk::new(ApplicationLog::new(MemoryStore::default(), "biscyne_applications"))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap()
    }

    #[test]
    fn phone_pattern() {
        assert!(is_valid_phone("555-123-4567"));
        assert!(is_valid_phone("555 123 4567"));
        assert!(is_valid_phone("+48 600-100-200"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("abc-defg-hij"));
        assert!(!is_valid_phone("+48 600 100 200 300 400"));
    }

    #[test]
    fn phone_digits_must_be_ascii() {
        assert!(!is_valid_phone("٥٥٥١٢٣٤٥٦٧"));
        assert!(!is_valid_phone("５５５１２３４５６７"));
        assert!(!is_valid_phone("555-१२३-4567"));
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let form = pairs("Ana Nowak", "555-123-4567", "", "poland");
        assert_eq!(form.validate(), Err(ValidationError::MissingField("job")));
    }

    #[test]
    fn unknown_fields_are_kept() {
        let form = pairs("Ana Nowak", "555-123-4567", "welder", "poland");
        assert_eq!(form.extra.get("message").map(String::as_str), Some("available from May"));
    }

    #[test]
    fn accepted_submission_appends_one_record_and_shows_overlay() {
        let mut desk = desk();
        desk.submit(pairs("Jan Kowal", "600100200 1", "driver", "czechia"), now())
            .unwrap();

        let record = desk
            .submit(pairs("Ana Nowak", "555 123 4567", "welder", "poland"), now())
            .unwrap();
        assert_eq!(record.timestamp, now());

        let stored = desk.log().load().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["fullName"], "Jan Kowal");
        assert_eq!(stored[1], serde_json::to_value(&record).unwrap());
        assert!(desk.overlay().is_visible());
    }

    #[test]
    fn rejected_submission_writes_nothing() {
        let mut desk = desk();
        let err = desk
            .submit(pairs("", "555-123-4567", "welder", "poland"), now())
            .unwrap_err();
        assert!(matches!(err, FormError::Invalid(ValidationError::MissingField("fullName"))));

        let err = desk
            .submit(pairs("Ana Nowak", "12345", "welder", "poland"), now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid phone number.");

        assert!(desk.log().load().unwrap().is_empty());
        assert!(!desk.overlay().is_visible());
    }

    #[test]
    fn file_entries_are_skipped() {
        assert_eq!(text_entry("cv".into(), None), None);
        assert_eq!(
            text_entry("job".into(), Some("welder".into())),
            Some(("job".to_string(), "welder".to_string()))
        );
    }

    struct OfflineStore;

    impl KeyValueStore for OfflineStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    #[test]
    fn valid_submission_without_storage_fails_quietly() {
        let mut desk = ApplicationDesk::new(ApplicationLog::new(OfflineStore, "biscyne_applications"));
        let err = desk
            .submit(pairs("Ana Nowak", "555 123 4567", "welder", "poland"), now())
            .unwrap_err();
        assert!(matches!(err, FormError::Store(StoreError::Unavailable)));
        assert!(!desk.overlay().is_visible());
    }

    #[test]
    fn record_serializes_with_form_field_names() {
        let record = pairs("Ana Nowak", "555-123-4567", "welder", "poland").into_record(now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fullName"], "Ana Nowak");
        assert_eq!(json["message"], "available from May");
        assert_eq!(json["timestamp"], "2026-10-17T08:00:00Z");
    }

    #[test]
    fn overlay_closes_idempotently() {
        let mut overlay = Overlay::default();
        overlay.show();
        assert!(!overlay.on_key("Enter"));
        assert!(!overlay.on_backdrop_click(false));
        assert!(overlay.is_visible());

        assert!(overlay.on_key("Escape"));
        assert!(!overlay.on_key("Escape"));
        assert!(!overlay.hide());
        assert!(!overlay.is_visible());
    }
}
