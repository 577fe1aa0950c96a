//! Error types for the shot-types crate.
//!
//! These cover structural problems with an inbound batch. They are raised
//! before any model call is made and surface to callers as client errors.

use thiserror::Error;

/// Errors that can occur while reading a request batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The named field was absent or not an array
    #[error("`{field}` must be an array")]
    NotASequence { field: String },

    /// The batch contained no entries
    #[error("`{field}` must not be empty")]
    EmptyBatch { field: String },

    /// The batch exceeds the fixed per-request cap
    #[error("`{field}` has {count} entries, maximum is {max}")]
    BatchTooLarge {
        field: String,
        count: usize,
        max: usize,
    },

    /// A batch entry is missing a required value
    #[error("entry {index} in `{field}` is missing `{key}`")]
    MissingField {
        field: String,
        index: usize,
        key: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, InputError>;
