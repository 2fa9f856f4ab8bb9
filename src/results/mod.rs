//! Result types for lookups
//!
//! Defines the domain records produced by source fetchers and the merge step
//! that combines several suggestion lists into one ranked list.

mod merge;
mod types;

pub use merge::{dedup_by_label, merge_ranked};
pub use types::*;
