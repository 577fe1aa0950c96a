//! Rule implementations for the validation pipeline.
//!
//! This module contains the concrete rules that can be composed into a
//! ValidationPipeline.

pub mod length;
pub mod membership;
pub mod uniqueness;

// Re-export for convenience
pub use length::LengthRule;
pub use membership::MembershipRule;
pub use uniqueness::UniquenessRule;
