//! Parametrized item search within one list.
//!
//! # Invariants
//! - Results are always ordered by `sort_order ASC, id ASC`.
//! - Keyword matching is case-insensitive; a blank keyword matches every item.
//! - Exact-name matching compares the trimmed input byte-for-byte.

use crate::model::item::Item;
use crate::repo::item_repo::{parse_item_row, RepoResult, ITEM_SELECT_SQL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static COMPARISON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(<=|>=|!=|<>|==|=|<|>|≤|≥|≠)?\s*(\S*)\s*$")
        .expect("comparison pattern is valid")
});

/// Amount comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountComparison {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl AmountComparison {
    fn sql_operator(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "" | "=" | "==" => Some(Self::Equal),
            "!=" | "<>" | "≠" => Some(Self::NotEqual),
            "<" => Some(Self::Less),
            "<=" | "≤" => Some(Self::LessOrEqual),
            ">" => Some(Self::Greater),
            ">=" | "≥" => Some(Self::GreaterOrEqual),
            _ => None,
        }
    }
}

/// Search mode and operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ItemSearch {
    ExactName { name: String },
    Keyword { keyword: String },
    Amount { comparison: AmountComparison, value: f64 },
}

impl ItemSearch {
    /// Parses a typed amount filter such as `<= 2`, `≠0` or `3` (equality).
    pub fn parse_amount(input: &str) -> Result<Self, SearchParseError> {
        let captures = COMPARISON_RE
            .captures(input)
            .ok_or_else(|| SearchParseError::Malformed(input.trim().to_string()))?;
        let symbol = captures.get(1).map_or("", |m| m.as_str());
        let operand = captures.get(2).map_or("", |m| m.as_str());

        let comparison = AmountComparison::from_symbol(symbol)
            .ok_or_else(|| SearchParseError::Malformed(input.trim().to_string()))?;
        if operand.is_empty() {
            return Err(SearchParseError::MissingValue);
        }
        let value = operand
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| SearchParseError::InvalidNumber(operand.to_string()))?;

        Ok(Self::Amount { comparison, value })
    }
}

/// Failure to parse a user-typed amount comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchParseError {
    Malformed(String),
    MissingValue,
    InvalidNumber(String),
}

impl Display for SearchParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(input) => write!(f, "cannot read amount filter `{input}`"),
            Self::MissingValue => write!(f, "amount filter needs a number"),
            Self::InvalidNumber(value) => write!(f, "`{value}` is not a number"),
        }
    }
}

impl Error for SearchParseError {}

/// Runs one search against `list_name`.
pub(crate) fn search_items(
    conn: &Connection,
    list_name: &str,
    search: &ItemSearch,
) -> RepoResult<Vec<Item>> {
    let mut sql = format!("{ITEM_SELECT_SQL} WHERE list_name = ?");
    let mut bind_values = vec![Value::Text(list_name.to_string())];

    match search {
        ItemSearch::ExactName { name } => {
            sql.push_str(" AND name = ?");
            bind_values.push(Value::Text(name.trim().to_string()));
        }
        ItemSearch::Keyword { keyword } => {
            let keyword = keyword.trim();
            if !keyword.is_empty() {
                sql.push_str(" AND instr(lower(name), lower(?)) > 0");
                bind_values.push(Value::Text(keyword.to_string()));
            }
        }
        ItemSearch::Amount { comparison, value } => {
            sql.push_str(&format!(" AND amount {} ?", comparison.sql_operator()));
            bind_values.push(Value::Real(*value));
        }
    }
    sql.push_str(" ORDER BY sort_order ASC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_item_row(row)?);
    }
    Ok(items)
}
