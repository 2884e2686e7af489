//! Versioned snapshot envelopes persisted through a [`KeyValueStore`].

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::kv::KeyValueStore;

/// Version written into every [`SnapshotEnvelope`].
pub const SNAPSHOT_ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned wrapper around a persisted state payload.
pub struct SnapshotEnvelope {
    /// Envelope schema version.
    pub envelope_version: u32,
    /// Name of the owning state object (for example a form name).
    pub name: String,
    /// Serialized payload.
    pub payload: Value,
}

impl SnapshotEnvelope {
    /// Creates an envelope stamped with the current envelope version.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            envelope_version: SNAPSHOT_ENVELOPE_VERSION,
            name: name.into(),
            payload,
        }
    }
}

/// Builds a [`SnapshotEnvelope`] from a serializable payload.
///
/// # Errors
///
/// Returns an error when `payload` cannot be converted to JSON.
pub fn build_snapshot_envelope<T: Serialize>(
    name: &str,
    payload: &T,
) -> Result<SnapshotEnvelope, String> {
    let payload = serde_json::to_value(payload).map_err(|e| e.to_string())?;
    Ok(SnapshotEnvelope::new(name, payload))
}

/// Deserializes an envelope payload into a target type.
///
/// # Errors
///
/// Returns an error when the envelope version is unsupported or deserialization fails.
pub fn decode_snapshot_payload<T: DeserializeOwned>(
    envelope: &SnapshotEnvelope,
) -> Result<T, String> {
    if envelope.envelope_version != SNAPSHOT_ENVELOPE_VERSION {
        return Err(format!(
            "unsupported snapshot envelope version {}",
            envelope.envelope_version
        ));
    }
    serde_json::from_value(envelope.payload.clone()).map_err(|e| e.to_string())
}

/// Serializes `payload` into an envelope and writes it under `key`.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub fn save_snapshot_with<S: KeyValueStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    name: &str,
    payload: &T,
) -> Result<(), String> {
    let envelope = build_snapshot_envelope(name, payload)?;
    let raw = serde_json::to_string(&envelope).map_err(|e| e.to_string())?;
    store.set_item(key, &raw)
}

/// Reads the envelope stored under `key` and decodes its payload.
///
/// Returns `Ok(None)` when nothing is stored.
///
/// # Errors
///
/// Returns an error when the store read fails, the envelope is malformed, or the envelope belongs
/// to a different `name`.
pub fn load_snapshot_with<S: KeyValueStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
    name: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };
    let envelope: SnapshotEnvelope = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    if envelope.name != name {
        return Err(format!(
            "snapshot under `{key}` belongs to `{}`, expected `{name}`",
            envelope.name
        ));
    }
    decode_snapshot_payload(&envelope).map(Some)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::storage::kv::MemoryKeyValueStore;

    #[test]
    fn envelope_serialization_shape_is_stable() {
        let envelope = SnapshotEnvelope::new("login", json!({"username": "ada"}));

        let value = serde_json::to_value(&envelope).expect("serialize envelope");
        let object = value.as_object().expect("object");
        assert_eq!(object.get("envelope_version"), Some(&json!(1)));
        assert_eq!(object.get("name"), Some(&json!("login")));
        assert_eq!(object.get("payload"), Some(&json!({"username": "ada"})));
        assert!(!object.contains_key("envelopeVersion"));
    }

    #[test]
    fn snapshot_round_trips_through_store() {
        let store = MemoryKeyValueStore::default();
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), "ada".to_string());

        save_snapshot_with(&store, "form-login", "login", &fields).expect("save");
        let loaded: Option<BTreeMap<String, String>> =
            load_snapshot_with(&store, "form-login", "login").expect("load");
        assert_eq!(loaded, Some(fields));
    }

    #[test]
    fn missing_snapshot_loads_as_none() {
        let store = MemoryKeyValueStore::default();
        let loaded: Option<Value> = load_snapshot_with(&store, "form-x", "x").expect("load");
        assert_eq!(loaded, None);
    }

    #[test]
    fn snapshot_for_another_name_is_rejected() {
        let store = MemoryKeyValueStore::default();
        save_snapshot_with(&store, "form-login", "signup", &json!({})).expect("save");

        let err = load_snapshot_with::<_, Value>(&store, "form-login", "login")
            .expect_err("name mismatch");
        assert!(err.contains("signup"));
    }

    #[test]
    fn future_envelope_versions_are_rejected() {
        let mut envelope = SnapshotEnvelope::new("login", json!({}));
        envelope.envelope_version = 9;

        let err = decode_snapshot_payload::<Value>(&envelope).expect_err("unsupported version");
        assert!(err.contains('9'));
    }
}
