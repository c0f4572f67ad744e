//! Domain model for tracked supply items.
//!
//! # Responsibility
//! - Define the item record shared by repository, services and front ends.
//! - Own input validation for user-entered names, amounts and list names.
//!
//! # Invariants
//! - Every persisted item has a non-blank name and a finite, non-negative amount.
//! - An item belongs to exactly one list at a time.

pub mod item;
