use counselor_chat::{KeyValueStore, StoreError};
use web_sys::Storage;

/// `window.localStorage` as a [`KeyValueStore`]
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn new() -> Result<Self, StoreError> {
        let storage = crate::window()
            .ok()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StoreError::Backend("localStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

fn js_error(op: &str, key: &str, err: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Backend(format!("localStorage {} '{}' failed: {:?}", op, key, err))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(|e| js_error("get", key, e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("set", key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("remove", key, e))
    }
}
