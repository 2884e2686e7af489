use std::rc::Rc;

use platform_host::{KeyValueStore, MemoryKeyValueStore};

use crate::WebStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected storage strategy.
pub enum StorageStrategy {
    /// Browser `localStorage` through [`WebStorage`].
    Browser,
    /// Process-local [`MemoryKeyValueStore`] for native targets and tests.
    Memory,
}

/// Returns the storage strategy for the active build target.
pub const fn selected_storage_strategy() -> StorageStrategy {
    #[cfg(target_arch = "wasm32")]
    {
        StorageStrategy::Browser
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        StorageStrategy::Memory
    }
}

/// Builds the key/value store used for persisted UI state on the active target.
pub fn key_value_store() -> Rc<dyn KeyValueStore> {
    match selected_storage_strategy() {
        StorageStrategy::Browser => Rc::new(WebStorage::local()),
        StorageStrategy::Memory => Rc::new(MemoryKeyValueStore::default()),
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_builds_fall_back_to_memory_store() {
        assert_eq!(selected_storage_strategy(), StorageStrategy::Memory);

        let store = key_value_store();
        store.set_item("form-login", "{}").expect("set");
        assert_eq!(
            store.get_item("form-login").expect("get"),
            Some("{}".to_string())
        );
    }
}
