//! Flutter-facing bindings for the Stockpile core.

pub mod api;
