//! Browser LocalStorage as a `KeyValueStore`

use crate::persistence::{KeyValueStore, StoreError};

/// Handle to `window.localStorage`
pub struct WebStorage {
    storage: Option<web_sys::Storage>,
}

impl WebStorage {
    /// Grab LocalStorage; private browsing or a missing window leaves the
    /// store unavailable rather than failing
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage not available, progress will not be saved");
        }
        Self { storage }
    }
}

impl KeyValueStore for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
        storage
            .get_item(key)
            .map_err(|e| StoreError::Transport(format!("{:?}", e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StoreError::Quota(format!("{:?}", e)))
    }
}
