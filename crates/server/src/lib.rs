//! HTTP service for image analysis and shot-sequence planning.
//!
//! This crate wires the model client to the planning core:
//! - `analyzer` describes photos one model call at a time
//! - `planner` orders analyzed photos and falls back when the model misbehaves
//! - `routes` exposes both behind per-caller quotas

pub mod analyzer;
pub mod config;
pub mod error;
pub mod planner;
pub mod prompts;
pub mod rate_limit;
pub mod routes;

pub use analyzer::{AnalyzerConfig, ImageAnalyzer};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use planner::{PlanOutcome, PlannerConfig, SequencePlanner};
pub use rate_limit::{FixedWindowLimiter, QuotaCheck, QuotaDecision};
pub use routes::{AppState, router};
