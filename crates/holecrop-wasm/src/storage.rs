//! Browser `localStorage` backend for saved transforms.
//!
//! Each record is stored as a JSON string under its session key. When no
//! `window` is available (workers, or native builds) records live in memory
//! for the lifetime of the editor.

use holecrop_core::{KeyValueStore, MemoryStore, PersistenceError, TransformRecord};

#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore {
    fallback: MemoryStore,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use holecrop_core::PersistenceError;
    use wasm_bindgen::JsValue;

    pub(super) fn js_error(e: JsValue) -> PersistenceError {
        PersistenceError::Backend(format!("{:?}", e))
    }

    pub(super) fn local_storage() -> Result<Option<web_sys::Storage>, PersistenceError> {
        match web_sys::window() {
            Some(window) => window.local_storage().map_err(js_error),
            None => Ok(None),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<TransformRecord>, PersistenceError> {
        let Some(storage) = browser::local_storage()? else {
            return self.fallback.get(key);
        };
        match storage.get_item(key).map_err(browser::js_error)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, record: &TransformRecord) -> Result<(), PersistenceError> {
        let Some(storage) = browser::local_storage()? else {
            return self.fallback.set(key, record);
        };
        let raw = serde_json::to_string(record)?;
        storage.set_item(key, &raw).map_err(browser::js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        let Some(storage) = browser::local_storage()? else {
            return self.fallback.remove(key);
        };
        storage.remove_item(key).map_err(browser::js_error)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<TransformRecord>, PersistenceError> {
        self.fallback.get(key)
    }

    fn set(&mut self, key: &str, record: &TransformRecord) -> Result<(), PersistenceError> {
        self.fallback.set(key, record)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.fallback.remove(key)
    }
}
