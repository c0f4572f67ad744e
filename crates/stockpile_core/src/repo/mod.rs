//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the item store contract used by services.
//! - Keep SQLite query details out of service and front-end code.
//!
//! # Invariants
//! - Write paths validate items before any SQL mutation.
//! - A missing identifier is reported as `0` rows affected, never as an error.

pub mod item_repo;
