//! Synchronous key/value storage contracts and in-process adapters.
//!
//! The contract mirrors the browser `Storage` surface (`getItem` / `setItem` / `removeItem`) so
//! web-backed adapters stay thin, while in-memory adapters serve tests and non-browser targets.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Host service for string values stored per key.
pub trait KeyValueStore {
    /// Reads the raw value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), String>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium rejects the delete.
    fn remove_item(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that keeps nothing, for targets without storage and baseline tests.
pub struct NoopKeyValueStore;

impl KeyValueStore for NoopKeyValueStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    fn remove_item(&self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory store keyed by string. Clones share the same backing map.
pub struct MemoryKeyValueStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Returns the stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.inner.borrow().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// Loads and deserializes a typed JSON value through a [`KeyValueStore`].
///
/// # Errors
///
/// Returns an error when the store read or JSON deserialization fails.
pub fn load_json_with<S: KeyValueStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(value))
}

/// Serializes and saves a typed JSON value through a [`KeyValueStore`].
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub fn save_json_with<S: KeyValueStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.set_item(key, &raw)
}
