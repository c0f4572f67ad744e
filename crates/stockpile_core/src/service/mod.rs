//! Core use-case services.
//!
//! # Responsibility
//! - Turn raw user input into validated repository calls.
//! - Hold in-memory drag sessions until the gesture ends.
//!
//! # Invariants
//! - Validation failures are reported before any write is attempted.
//! - Services never issue SQL directly.

pub mod item_service;
pub mod reorder_session;
