//! In-memory drag session for one list.
//!
//! # Responsibility
//! - Apply every intermediate drag step to a snapshot without touching storage.
//! - Persist the whole mutated sequence once, when the gesture ends.
//!
//! # Invariants
//! - `move_item` never writes; `finish` writes at most once.
//! - `finish` writes `order` only, so edits made after the snapshot survive.
//! - A finished sequence has strictly increasing `order` values.

use crate::model::item::Item;
use crate::reorder::{normalize_orders, reorder, ReorderError};
use crate::repo::item_repo::{ItemRepository, RepoResult};

/// Snapshot of one list being rearranged by the user.
#[derive(Debug, Clone)]
pub struct ReorderSession {
    list_name: String,
    items: Vec<Item>,
    moved: bool,
}

impl ReorderSession {
    /// Starts a session from the list as currently displayed.
    pub fn new(list_name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            list_name: list_name.into(),
            items,
            moved: false,
        }
    }

    pub fn list_name(&self) -> &str {
        &self.list_name
    }

    /// Current in-memory order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Whether any step changed the sequence.
    pub fn has_moves(&self) -> bool {
        self.moved
    }

    /// Applies one drag step from `from` to `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), ReorderError> {
        if reorder(&mut self.items, from, to)?.is_some() {
            self.moved = true;
        }
        Ok(())
    }

    /// Ends the gesture and persists the sequence in one bulk update.
    ///
    /// Returns rows written; `0` when the drag never moved anything.
    pub fn finish<R: ItemRepository + ?Sized>(mut self, repo: &R) -> RepoResult<usize> {
        let renumbered = normalize_orders(&mut self.items);
        if !self.moved && !renumbered {
            return Ok(0);
        }
        repo.update_orders(&self.items)
    }
}
