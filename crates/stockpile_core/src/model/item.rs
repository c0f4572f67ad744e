//! Item domain model.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `name` is non-blank after trimming.
//! - `amount` is finite and `>= 0`; `0` means the item is empty.
//! - `is_full` is a user marker and does not depend on `amount`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned item identifier.
pub type ItemId = i64;

/// Reserved list name for the default working list.
///
/// Items live here until the user saves the list under a name of their own.
pub const UNSAVED_LIST_NAME: &str = "__unsaved__";

/// Persisted supply item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub amount: f64,
    pub is_full: bool,
    /// Display position within `list_name`. Gaps are allowed.
    pub order: i64,
    pub list_name: String,
}

/// Item fields supplied by the caller on creation.
///
/// `id` and `order` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub amount: f64,
    pub is_full: bool,
    pub list_name: String,
}

impl NewItem {
    /// Creates an item draft that is neither full nor sized yet.
    pub fn new(list_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: 0.0,
            is_full: false,
            list_name: list_name.into(),
        }
    }

    /// Sets the initial amount.
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the initial full marker.
    pub fn with_full(mut self, is_full: bool) -> Self {
        self.is_full = is_full;
        self
    }

    /// Validates fields before any write.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_fields(&self.name, self.amount)
    }
}

/// Display state derived from `is_full` and `amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Full,
    Empty,
    Leftover,
}

impl ItemState {
    /// Stable lowercase label used by front ends.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Empty => "empty",
            Self::Leftover => "leftover",
        }
    }
}

impl Item {
    /// Validates fields before any write.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_fields(&self.name, self.amount)
    }

    /// Returns `true` when nothing is left (`amount <= 0`).
    pub fn is_empty(&self) -> bool {
        self.amount <= 0.0
    }

    /// Derived display state. `is_full` takes precedence over `amount`.
    pub fn state(&self) -> ItemState {
        if self.is_full {
            ItemState::Full
        } else if self.is_empty() {
            ItemState::Empty
        } else {
            ItemState::Leftover
        }
    }
}

/// User-facing validation failure, raised before any write is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyName,
    AmountNotNumeric(String),
    NegativeAmount,
    NonFiniteAmount,
    BlankListName,
    ReservedListName,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name must not be empty"),
            Self::AmountNotNumeric(input) => write!(f, "amount `{input}` is not a number"),
            Self::NegativeAmount => write!(f, "amount must not be negative"),
            Self::NonFiniteAmount => write!(f, "amount must be a finite number"),
            Self::BlankListName => write!(f, "list name must not be empty"),
            Self::ReservedListName => write!(f, "list name is reserved"),
        }
    }
}

impl Error for ItemValidationError {}

/// Parses a user-entered amount.
///
/// Blank input means "nothing left" and parses as `0`.
pub fn parse_amount(input: &str) -> Result<f64, ItemValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let amount = trimmed
        .parse::<f64>()
        .map_err(|_| ItemValidationError::AmountNotNumeric(trimmed.to_string()))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Normalizes a user-entered name, rejecting blank input.
pub fn normalize_name(input: &str) -> Result<String, ItemValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Normalizes a list name chosen by the user for saving.
///
/// The unsaved working list cannot be addressed this way.
pub fn normalize_list_name(input: &str) -> Result<String, ItemValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ItemValidationError::BlankListName);
    }
    if trimmed == UNSAVED_LIST_NAME {
        return Err(ItemValidationError::ReservedListName);
    }
    Ok(trimmed.to_string())
}

fn validate_fields(name: &str, amount: f64) -> Result<(), ItemValidationError> {
    if name.trim().is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    validate_amount(amount)
}

fn validate_amount(amount: f64) -> Result<(), ItemValidationError> {
    if !amount.is_finite() {
        return Err(ItemValidationError::NonFiniteAmount);
    }
    if amount < 0.0 {
        return Err(ItemValidationError::NegativeAmount);
    }
    Ok(())
}
