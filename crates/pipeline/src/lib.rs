//! Validation and fallback pipeline for shot sequences.
//!
//! This crate provides the pure, I/O-free core of sequence planning:
//! - Rule trait and implementations for checking candidate orderings
//! - ValidationPipeline for composing rules
//! - The deterministic fallback ordering
//! - Parsing and projection of raw model output
//! - Assembly of the final shot plan
//!
//! ## Architecture
//! A model response moves through the crate in stages:
//! 1. `response` strips markdown fences and parses JSON
//! 2. `candidate` projects the untyped value into a CandidatePlan
//! 3. `ValidationPipeline` accepts or rejects its ordering
//! 4. `shots` assembles a FinalPlan from the accepted or fallback ordering
//!
//! `planning::plan_from_output` runs all four stages for one model reply.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{CandidatePlan, ValidationPipeline, response, shots};
//!
//! let value = response::parse_json(&raw)?;
//! let candidate = CandidatePlan::from_value(&value);
//! let plan = match ValidationPipeline::standard()
//!     .validate(candidate.ordered_ids.as_deref(), &items, items.len())
//! {
//!     Ok(()) => shots::assemble_plan(&items, ids, Some(&candidate), PlannerKind::Ai),
//!     Err(_) => shots::fallback_plan(&items, None),
//! };
//! ```

pub mod traits;
pub mod rules;
pub mod rule_pipeline;
pub mod fallback;
pub mod response;
pub mod candidate;
pub mod shots;
pub mod planning;

// Re-export main types
pub use traits::{Rule, RuleViolation};
pub use rule_pipeline::{ValidationPipeline, is_valid_selection};
pub use fallback::fallback_order;
pub use candidate::{Beat, CandidatePlan, ordering_from_value};
pub use response::{ParseError, parse_json, parse_or, strip_code_fences};
pub use shots::{assemble_plan, fallback_plan, role_for_position};
pub use planning::{PlanOutcome, plan_from_output};
