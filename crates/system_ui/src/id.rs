//! Unique identifiers for component instances.

use std::cell::Cell;

use uuid::Uuid;

const RANDOM_SUFFIX_LEN: usize = 8;

thread_local! {
    static NEXT_SEQUENCE: Cell<u64> = const { Cell::new(1) };
}

/// Returns an identifier of the form `{prefix}-{sequence}-{suffix}`.
///
/// The sequence is unique per thread and the suffix is random, so ids never repeat within a
/// process and are unlikely to collide with ids rendered by another root.
pub fn next_id(prefix: &str) -> String {
    let sequence = NEXT_SEQUENCE.with(|next| {
        let value = next.get();
        next.set(value.wrapping_add(1));
        value
    });
    let random = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{sequence}-{}", &random[..RANDOM_SUFFIX_LEN])
}
