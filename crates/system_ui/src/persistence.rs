//! Form snapshot persistence through a host [`KeyValueStore`].
//!
//! Snapshots hold the field map only; errors and status are never persisted. Store failures are
//! logged and swallowed so a broken storage medium never blocks editing.

use platform_host::{load_snapshot_with, save_snapshot_with, KeyValueStore};

use crate::form::{FieldMap, FieldValue};

/// Namespace prefix for persisted form snapshots.
pub const FORM_STORAGE_PREFIX: &str = "form-";

/// Storage key for the form named `name`.
pub fn form_storage_key(name: &str) -> String {
    format!("{FORM_STORAGE_PREFIX}{name}")
}

pub(crate) fn hydrate_fields<T: FieldValue>(
    store: &dyn KeyValueStore,
    name: &str,
) -> Option<FieldMap<T>> {
    match load_snapshot_with(store, &form_storage_key(name), name) {
        Ok(fields) => fields,
        Err(err) => {
            leptos::logging::warn!("form `{name}` snapshot load failed: {err}");
            None
        }
    }
}

pub(crate) fn write_fields<T: FieldValue>(
    store: &dyn KeyValueStore,
    name: &str,
    fields: &FieldMap<T>,
) {
    if let Err(err) = save_snapshot_with(store, &form_storage_key(name), name, fields) {
        leptos::logging::warn!("form `{name}` snapshot write failed: {err}");
    }
}

pub(crate) fn clear_fields(store: &dyn KeyValueStore, name: &str) {
    if let Err(err) = store.remove_item(&form_storage_key(name)) {
        leptos::logging::warn!("form `{name}` snapshot clear failed: {err}");
    }
}
