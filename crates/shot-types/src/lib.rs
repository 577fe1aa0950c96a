//! # Shot Types Crate
//!
//! Domain types shared by the planner, the analyzer and the HTTP layer.
//!
//! ## Main Components
//!
//! - **types**: Item, ItemAnalysis, FinalPlan, Shot, PhotoInput, AnalysisResult
//! - **index**: ItemSet, the per-request id index
//! - **normalize**: projection of untyped JSON into the types above
//! - **error**: structural input errors
//!
//! ## Example Usage
//!
//! ```ignore
//! use shot_types::normalize::{batch_entries, items_from_values};
//!
//! let entries = batch_entries(&body, "analysisResults", 200)?;
//! let items = items_from_values(entries);
//! println!("planning {} items", items.len());
//! ```

pub mod error;
pub mod types;
pub mod normalize;
pub mod index;

pub use error::{InputError, Result};
pub use types::{
    // Type aliases
    ItemId,
    // Core types
    AnalysisResult,
    ArcBeat,
    FinalPlan,
    Item,
    ItemAnalysis,
    ItemSet,
    PhotoInput,
    PlannerKind,
    RoleScore,
    Shot,
    // Constants
    DEFAULT_VISUAL_ENERGY,
    SHOT_DURATION,
    TRANSITION,
};
