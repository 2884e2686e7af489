//! Storage contracts shared by the UI state core and host adapters.

pub mod kv;
pub mod snapshot;
