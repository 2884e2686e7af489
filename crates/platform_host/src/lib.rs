//! Typed host storage contracts shared by the UI state core and browser adapters.
//!
//! This crate is the API boundary for persistence. It exposes the synchronous
//! [`KeyValueStore`] contract, in-process adapters, and versioned snapshot helpers, while the
//! browser-backed adapter lives in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;

pub use storage::kv::{
    load_json_with, save_json_with, KeyValueStore, MemoryKeyValueStore, NoopKeyValueStore,
};
pub use storage::snapshot::{
    build_snapshot_envelope, decode_snapshot_payload, load_snapshot_with, save_snapshot_with,
    SnapshotEnvelope, SNAPSHOT_ENVELOPE_VERSION,
};
