//! Configuration and usage errors raised by the interaction-state core.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Setup-time errors. These signal programming mistakes and are not recoverable at runtime.
///
/// Validation problems are never reported through this type; they live in a form's error map.
pub enum UiError {
    /// Two inputs mounted into the same form share a `name`.
    #[error("duplicate field name `{field}` in form `{form}`")]
    DuplicateFieldName {
        /// Form that owns the inputs.
        form: String,
        /// Repeated input name.
        field: String,
    },
    /// A context lookup ran outside the matching provider.
    #[error("{0} context not provided")]
    MissingContext(&'static str),
    /// A select option index does not exist.
    #[error("option index {index} out of range ({len} options)")]
    OptionOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of options.
        len: usize,
    },
    /// A select option exists but is disabled.
    #[error("option {0} is disabled")]
    OptionDisabled(usize),
}
