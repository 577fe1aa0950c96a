//! Core traits for the validation pipeline.
//!
//! This module defines the Rule trait that lets independent structural
//! checks on a candidate ordering be composed into a ValidationPipeline.

use shot_types::{ItemId, ItemSet};
use thiserror::Error;

/// Why a candidate ordering was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("ordering is missing or not an array of ids")]
    NotASequence,

    #[error("ordering has {actual} ids, expected {expected}")]
    WrongLength { expected: usize, actual: usize },

    #[error("ordering contains unknown id {0:?}")]
    UnknownId(ItemId),

    #[error("ordering repeats id {0:?}")]
    DuplicateId(ItemId),
}

/// A single structural check on a candidate ordering.
///
/// ## Design Note
/// - `Send + Sync` so one pipeline can be shared across requests
/// - Rules borrow the ordering; they never repair it
pub trait Rule: Send + Sync {
    /// Returns the name of this rule (for logging/debugging)
    fn name(&self) -> &str;

    /// Check the ordering against the request's items.
    ///
    /// # Arguments
    /// * `ordered_ids` - The candidate ordering
    /// * `items` - The request's item set
    /// * `target_count` - How many ids the ordering must hold
    fn check(
        &self,
        ordered_ids: &[ItemId],
        items: &ItemSet,
        target_count: usize,
    ) -> Result<(), RuleViolation>;
}
