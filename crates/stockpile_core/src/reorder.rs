//! Drag-and-drop reorder engine.
//!
//! # Responsibility
//! - Recompute `order` for the rows a single drag gesture passes over.
//! - Stay pure: no storage access, callers persist the result explicitly.
//!
//! # Invariants
//! - The multiset of `order` values in the sequence is unchanged by `reorder`.
//! - Rows outside `min(from, to)..=max(from, to)` keep identity and `order`.
//! - Every intermediate step is a valid ordering (no duplicate positions are introduced).

use crate::model::item::Item;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// Reorder precondition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderError {
    IndexOutOfBounds { index: usize, len: usize },
}

impl Display for ReorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "reorder index {index} out of bounds for {len} item(s)")
            }
        }
    }
}

impl Error for ReorderError {}

/// Moves the item at `from` to `to` as a chain of adjacent swaps.
///
/// Each step exchanges a neighbouring pair and their `order` values, which is
/// what the list shows while a row is dragged over its neighbours.
///
/// Returns the index range whose rows changed, or `None` for `from == to`.
/// The sequence is left untouched when either index is out of bounds.
pub fn reorder(
    items: &mut [Item],
    from: usize,
    to: usize,
) -> Result<Option<RangeInclusive<usize>>, ReorderError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::IndexOutOfBounds { index, len });
        }
    }

    if from < to {
        for index in from..to {
            swap_adjacent(items, index);
        }
    } else {
        for index in (to..from).rev() {
            swap_adjacent(items, index);
        }
    }

    Ok((from != to).then(|| from.min(to)..=from.max(to)))
}

/// Renumbers `order` to `0..n` unless the sequence is already strictly increasing.
///
/// Returns whether any value was rewritten. Used once a gesture ends so that
/// ties left over from older data do not survive a persisted reorder.
pub fn normalize_orders(items: &mut [Item]) -> bool {
    let strictly_increasing = items.windows(2).all(|pair| pair[0].order < pair[1].order);
    if strictly_increasing {
        return false;
    }
    for (position, item) in items.iter_mut().enumerate() {
        item.order = position as i64;
    }
    true
}

fn swap_adjacent(items: &mut [Item], index: usize) {
    let (left, right) = items.split_at_mut(index + 1);
    std::mem::swap(&mut left[index].order, &mut right[0].order);
    items.swap(index, index + 1);
}
