use counselor_types::{Profile, Theme, PROFILE_KEY, THEME_KEY};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Errors raised by a key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Backend(String),

    #[error("failed to encode value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable string key-value storage (browser localStorage, a JSON file, ...)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, used by tests and as a last resort when no durable storage exists
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Profile persisted as JSON under the `profile` key
#[derive(Clone)]
pub struct ProfileStore {
    backend: Rc<dyn KeyValueStore>,
}

impl ProfileStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Absent, unreadable or malformed entries all load as the empty profile
    pub fn load(&self) -> Profile {
        let raw = match self.backend.get(PROFILE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Profile::default(),
            Err(e) => {
                log::warn!("Failed to read profile: {}", e);
                return Profile::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed stored profile: {}", e);
            Profile::default()
        })
    }

    pub fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        let json = serde_json::to_string(profile)?;
        self.backend.set(PROFILE_KEY, &json)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove(PROFILE_KEY)
    }
}

/// Theme preference persisted under the `theme` key
#[derive(Clone)]
pub struct ThemeStore {
    backend: Rc<dyn KeyValueStore>,
}

impl ThemeStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn load(&self) -> Theme {
        match self.backend.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                log::warn!("{}; using light theme", e);
                Theme::Light
            }),
            Ok(None) => Theme::Light,
            Err(e) => {
                log::warn!("Failed to read theme: {}", e);
                Theme::Light
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<(), StoreError> {
        self.backend.set(THEME_KEY, theme.as_str())
    }
}
