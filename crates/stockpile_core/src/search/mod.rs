//! Item search entry points.
//!
//! # Responsibility
//! - Describe search modes (exact name, keyword, amount comparison).
//! - Parse user-typed amount comparisons such as `<= 2`.
//! - Build the search SQL inside core.

pub mod item_search;
