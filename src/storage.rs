use std::collections::HashMap;

use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::components::apply_form::ApplicationRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("stored applications are not valid JSON: {0}")]
    Corrupt(serde_json::Error),
    #[error("failed to encode applications: {0}")]
    Encode(serde_json::Error),
    #[error("failed to write to local storage: {0}")]
    Write(String),
}

/// Flat string storage, shaped like the browser's `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl KeyValueStore for web_sys::Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        web_sys::Storage::get_item(self, key).map_err(|_| StoreError::Unavailable)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        web_sys::Storage::set_item(self, key, value)
            .map_err(|err| StoreError::Write(format!("{:?}", err)))
    }
}

/// The page's `localStorage`, which some sandboxed frames and privacy modes
/// withhold. Every access fails with `Unavailable` when it is missing.
pub struct BrowserStore(Option<web_sys::Storage>);

impl BrowserStore {
    pub fn from_window(window: &web_sys::Window) -> Self {
        Self(window.local_storage().ok().flatten())
    }

    pub fn is_available(&self) -> bool {
        self.0.is_some()
    }
}

impl KeyValueStore for BrowserStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = self.0.as_ref().ok_or(StoreError::Unavailable)?;
        KeyValueStore::get_item(storage, key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.0.as_mut().ok_or(StoreError::Unavailable)?;
        KeyValueStore::set_item(storage, key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Append-only list of submitted applications kept under a single key.
pub struct ApplicationLog<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> ApplicationLog<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Entries are kept as raw JSON so older or hand-edited records never
    /// block new ones. Only a value that is not a JSON array is an error.
    pub fn load(&self) -> Result<Vec<Value>, StoreError> {
        match self.store.get_item(&self.key)? {
            Some(raw) if !raw.is_empty() => {
                serde_json::from_str(&raw).map_err(StoreError::Corrupt)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Read the whole list, push `record`, write the whole list back.
    /// Returns the new length.
    pub fn append(&mut self, record: &ApplicationRecord) -> Result<usize, StoreError> {
        let mut applications = self.load()?;
        applications.push(serde_json::to_value(record).map_err(StoreError::Encode)?);
        let encoded = serde_json::to_string(&applications).map_err(StoreError::Encode)?;
        self.store.set_item(&self.key, &encoded)?;
        debug!("Stored {} applications under {}", applications.len(), self.key);
        Ok(applications.len())
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::apply_form::ApplicationForm;
    use chrono::{TimeZone, Utc};

    fn record(name: &str) -> ApplicationRecord {
        let form = ApplicationForm::from_pairs(vec![
            ("fullName".to_string(), name.to_string()),
            ("phone".to_string(), "+48 600 100 200".to_string()),
            ("job".to_string(), "welder".to_string()),
            ("country".to_string(), "poland".to_string()),
        ]);
        form.into_record(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
    }

    #[test]
    fn missing_key_loads_as_empty_list() {
        let log = ApplicationLog::new(MemoryStore::default(), "apps");
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn append_keeps_prior_entries() {
        let mut log = ApplicationLog::new(MemoryStore::default(), "apps");
        assert_eq!(log.append(&record("Ana Nowak")).unwrap(), 1);
        assert_eq!(log.append(&record("Jan Kowal")).unwrap(), 2);

        let stored = log.load().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["fullName"], "Ana Nowak");
        assert_eq!(stored[1]["fullName"], "Jan Kowal");
    }

    #[test]
    fn empty_stored_value_counts_as_no_list() {
        let mut log = ApplicationLog::new(MemoryStore::default(), "apps");
        log.store_mut().set_item("apps", "").unwrap();

        assert_eq!(log.append(&record("Ana Nowak")).unwrap(), 1);
        assert_eq!(log.load().unwrap()[0]["job"], "welder");
    }

    #[test]
    fn foreign_shaped_entries_are_carried_over() {
        let mut log = ApplicationLog::new(MemoryStore::default(), "apps");
        let prior = r#"[{"fullName":"Old Entry","age":30},"note"]"#;
        log.store_mut().set_item("apps", prior).unwrap();

        assert_eq!(log.append(&record("Ana Nowak")).unwrap(), 3);
        let stored = log.load().unwrap();
        assert_eq!(stored[0]["age"], 30);
        assert_eq!(stored[1], "note");
        assert_eq!(stored[2]["fullName"], "Ana Nowak");
    }

    #[test]
    fn missing_browser_storage_is_unavailable() {
        let mut log = ApplicationLog::new(BrowserStore(None), "apps");
        assert!(matches!(log.load(), Err(StoreError::Unavailable)));
        assert!(matches!(
            log.append(&record("Ana Nowak")),
            Err(StoreError::Unavailable)
        ));
    }

    #[test]
    fn corrupt_content_is_reported_and_left_alone() {
        let mut log = ApplicationLog::new(MemoryStore::default(), "apps");
        log.store_mut().set_item("apps", "{not json").unwrap();

        let err = log.append(&record("Ana Nowak")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
        assert_eq!(
            log.store_mut().get_item("apps").unwrap().as_deref(),
            Some("{not json")
        );
    }
}
