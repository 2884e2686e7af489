//! Browser (`wasm32`) implementations of [`platform_host`] storage contracts.
//!
//! [`WebStorage`] wraps `window.localStorage` / `window.sessionStorage` behind
//! [`platform_host::KeyValueStore`]. On non-wasm targets the browser adapter is inert and
//! [`adapters::key_value_store`] falls back to an in-memory store.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Target-dependent store selection for runtime wiring.
pub mod adapters;
pub mod storage;

pub use adapters::{key_value_store, selected_storage_strategy, StorageStrategy};
pub use storage::web_storage::{WebStorage, WebStorageArea};
