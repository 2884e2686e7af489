//! `Storage`-backed key/value store (`localStorage` or `sessionStorage`).
//!
//! The browser API is synchronous, so this adapter maps one-to-one onto
//! [`platform_host::KeyValueStore`].

use platform_host::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Which browser storage area backs a [`WebStorage`].
pub enum WebStorageArea {
    /// `window.localStorage`, durable across sessions.
    #[default]
    Local,
    /// `window.sessionStorage`, scoped to the tab session.
    Session,
}

impl WebStorageArea {
    /// Stable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "localStorage",
            Self::Session => "sessionStorage",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser key/value store backed by a [`WebStorageArea`].
pub struct WebStorage {
    area: WebStorageArea,
}

impl WebStorage {
    /// Store backed by `window.localStorage`.
    pub const fn local() -> Self {
        Self {
            area: WebStorageArea::Local,
        }
    }

    /// Store backed by `window.sessionStorage`.
    pub const fn session() -> Self {
        Self {
            area: WebStorageArea::Session,
        }
    }

    /// Returns the backing storage area.
    pub fn area(self) -> WebStorageArea {
        self.area
    }

    #[cfg(target_arch = "wasm32")]
    fn storage(self) -> Result<web_sys::Storage, String> {
        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
        let storage = match self.area {
            WebStorageArea::Local => window.local_storage(),
            WebStorageArea::Session => window.session_storage(),
        };
        storage
            .ok()
            .flatten()
            .ok_or_else(|| format!("{} unavailable", self.area.label()))
    }
}

impl KeyValueStore for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            self.storage()?
                .get_item(key)
                .map_err(|e| format!("{} get_item failed: {e:?}", self.area.label()))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            self.storage()?
                .set_item(key, value)
                .map_err(|e| format!("{} set_item failed: {e:?}", self.area.label()))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            self.storage()?
                .remove_item(key)
                .map_err(|e| format!("{} remove_item failed: {e:?}", self.area.label()))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}
