//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, bulk delete, sorted listing and search over `items`.
//! - Assign identifiers and `sort_order` for new rows.
//! - Own list-level operations (copy, delete, move item between lists).
//!
//! # Invariants
//! - New items get `sort_order = max + 1` within their list (`0` for an empty list).
//! - Identifiers come from `AUTOINCREMENT` and are never reused.
//! - Updates are scoped to the item's own list; moving lists is delete + recreate.
//! - Sorted listings break ties by insertion order (`id ASC`).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{Item, ItemId, ItemValidationError, NewItem, UNSAVED_LIST_NAME};
use crate::search::item_search::{self, ItemSearch};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use rusqlite::{Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const ITEM_SELECT_SQL: &str = "SELECT
    id,
    name,
    amount,
    is_full,
    sort_order,
    list_name
FROM items";

const REQUIRED_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "amount",
    "is_full",
    "sort_order",
    "list_name",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before any write.
    Validation(ItemValidationError),
    /// Underlying storage failure.
    Db(DbError),
    /// Persisted row cannot be converted into a valid item.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Whether the error came from user input rather than storage.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "item repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "item repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "item repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// State predicate shared by listing and bulk delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFilter {
    /// No filtering.
    #[default]
    All,
    /// `amount <= 0`.
    Empty,
    /// `amount > 0` and not marked full.
    Leftover,
    /// Marked full.
    Full,
}

impl ItemFilter {
    fn sql_condition(self) -> &'static str {
        match self {
            Self::All => "1 = 1",
            Self::Empty => "amount <= 0",
            Self::Leftover => "amount > 0 AND is_full = 0",
            Self::Full => "is_full = 1",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// User-defined display position.
    #[default]
    Order,
    /// Case-insensitive name.
    Name,
    Amount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Listing options for one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub list_name: String,
    pub filter: ItemFilter,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

impl ItemQuery {
    /// All items of `list_name` in display order.
    pub fn new(list_name: impl Into<String>) -> Self {
        Self {
            list_name: list_name.into(),
            filter: ItemFilter::All,
            sort_key: SortKey::Order,
            direction: SortDirection::Ascending,
        }
    }

    pub fn filter(mut self, filter: ItemFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort_by(mut self, sort_key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = sort_key;
        self.direction = direction;
        self
    }

    fn order_by_clause(&self) -> String {
        let column = match self.sort_key {
            SortKey::Order => "sort_order",
            SortKey::Name => "name COLLATE NOCASE",
            SortKey::Amount => "amount",
        };
        let direction = match self.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        format!("ORDER BY {column} {direction}, id ASC")
    }
}

/// Repository interface for the item store.
pub trait ItemRepository {
    /// Inserts a new item at the end of its list and returns its id.
    fn create_item(&self, item: &NewItem) -> RepoResult<ItemId>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Overwrites name, amount, full flag and order. Returns rows affected.
    fn update_item(&self, item: &Item) -> RepoResult<usize>;
    /// Overwrites many items in one transaction. Returns rows affected.
    fn update_items(&self, items: &[Item]) -> RepoResult<usize>;
    /// Writes only `order` of each item, in one transaction. Returns rows affected.
    fn update_orders(&self, items: &[Item]) -> RepoResult<usize>;
    /// Deletes by id. Returns `0` or `1`.
    fn delete_item(&self, id: ItemId) -> RepoResult<usize>;
    /// Deletes every item of `list_name` matching `filter`.
    fn delete_where(&self, list_name: &str, filter: ItemFilter) -> RepoResult<usize>;
    fn query_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>>;
    /// Searches one list; results come back in display order.
    fn search_items(&self, list_name: &str, search: &ItemSearch) -> RepoResult<Vec<Item>>;
    /// Distinct saved list names, excluding the unsaved working list.
    fn list_names(&self) -> RepoResult<Vec<String>>;
    fn delete_list(&self, list_name: &str) -> RepoResult<usize>;
    /// Replaces `target` with fresh copies of `source`, keeping relative order.
    fn copy_list(&self, source: &str, target: &str) -> RepoResult<usize>;
    /// Recreates the item at the end of `target` under a new id.
    fn move_to_list(&self, id: ItemId, target: &str) -> RepoResult<Option<ItemId>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_item_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn immediate_tx(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        item.validate()?;

        let tx = self.immediate_tx()?;
        let id = insert_item(&tx, item)?;
        tx.commit()?;
        Ok(id)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        load_item(self.conn, id)
    }

    fn update_item(&self, item: &Item) -> RepoResult<usize> {
        item.validate()?;
        write_item(self.conn, item)
    }

    fn update_items(&self, items: &[Item]) -> RepoResult<usize> {
        for item in items {
            item.validate()?;
        }

        let tx = self.immediate_tx()?;
        let mut changed = 0;
        for item in items {
            changed += write_item(&tx, item)?;
        }
        tx.commit()?;
        Ok(changed)
    }

    fn update_orders(&self, items: &[Item]) -> RepoResult<usize> {
        let tx = self.immediate_tx()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE items
                 SET
                    sort_order = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND list_name = ?3;",
            )?;
            for item in items {
                changed += stmt.execute(params![item.id, item.order, item.list_name.as_str()])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM items WHERE id = ?1;", [id])?)
    }

    fn delete_where(&self, list_name: &str, filter: ItemFilter) -> RepoResult<usize> {
        let sql = format!(
            "DELETE FROM items WHERE list_name = ?1 AND {};",
            filter.sql_condition()
        );
        Ok(self.conn.execute(&sql, [list_name])?)
    }

    fn query_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>> {
        let sql = format!(
            "{ITEM_SELECT_SQL} WHERE list_name = ? AND {} {}",
            query.filter.sql_condition(),
            query.order_by_clause()
        );
        let bind_values = vec![Value::Text(query.list_name.clone())];

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn search_items(&self, list_name: &str, search: &ItemSearch) -> RepoResult<Vec<Item>> {
        item_search::search_items(self.conn, list_name, search)
    }

    fn list_names(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT list_name
             FROM items
             WHERE list_name <> ?1
             ORDER BY list_name COLLATE NOCASE ASC, list_name ASC;",
        )?;
        let names = stmt
            .query_map([UNSAVED_LIST_NAME], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn delete_list(&self, list_name: &str) -> RepoResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM items WHERE list_name = ?1;", [list_name])?)
    }

    fn copy_list(&self, source: &str, target: &str) -> RepoResult<usize> {
        if source == target {
            return Ok(0);
        }

        let tx = self.immediate_tx()?;
        tx.execute("DELETE FROM items WHERE list_name = ?1;", [target])?;
        let copied = tx.execute(
            "INSERT INTO items (name, amount, is_full, sort_order, list_name)
             SELECT
                name,
                amount,
                is_full,
                ROW_NUMBER() OVER (ORDER BY sort_order ASC, id ASC) - 1,
                ?2
             FROM items
             WHERE list_name = ?1
             ORDER BY sort_order ASC, id ASC;",
            params![source, target],
        )?;
        tx.commit()?;
        Ok(copied)
    }

    fn move_to_list(&self, id: ItemId, target: &str) -> RepoResult<Option<ItemId>> {
        let tx = self.immediate_tx()?;
        let Some(existing) = load_item(&tx, id)? else {
            return Ok(None);
        };

        tx.execute("DELETE FROM items WHERE id = ?1;", [id])?;
        let moved = NewItem {
            name: existing.name,
            amount: existing.amount,
            is_full: existing.is_full,
            list_name: target.to_string(),
        };
        let new_id = insert_item(&tx, &moved)?;
        tx.commit()?;
        Ok(Some(new_id))
    }
}

fn insert_item(conn: &Connection, item: &NewItem) -> RepoResult<ItemId> {
    let sort_order = next_sort_order(conn, &item.list_name)?;
    conn.execute(
        "INSERT INTO items (name, amount, is_full, sort_order, list_name)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            item.name.trim(),
            item.amount,
            bool_to_int(item.is_full),
            sort_order,
            item.list_name.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn write_item(conn: &Connection, item: &Item) -> RepoResult<usize> {
    let changed = conn.execute(
        "UPDATE items
         SET
            name = ?2,
            amount = ?3,
            is_full = ?4,
            sort_order = ?5,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1
           AND list_name = ?6;",
        params![
            item.id,
            item.name.trim(),
            item.amount,
            bool_to_int(item.is_full),
            item.order,
            item.list_name.as_str(),
        ],
    )?;
    Ok(changed)
}

fn load_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_item_row(row)?)),
        None => Ok(None),
    }
}

fn next_sort_order(conn: &Connection, list_name: &str) -> RepoResult<i64> {
    let next: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM items WHERE list_name = ?1;",
        [list_name],
        |row| row.get(0),
    )?;
    Ok(next)
}

pub(crate) fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id: ItemId = row.get("id")?;
    let is_full = match row.get::<_, i64>("is_full")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_full value `{other}` in items.is_full (id {id})"
            )));
        }
    };

    let item = Item {
        id,
        name: row.get("name")?,
        amount: row.get("amount")?,
        is_full,
        order: row.get("sort_order")?,
        list_name: row.get("list_name")?,
    };
    item.validate()
        .map_err(|err| RepoError::InvalidData(format!("invalid item {id}: {err}")))?;
    Ok(item)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn ensure_item_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "items")? {
        return Err(RepoError::MissingRequiredTable("items"));
    }
    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "items", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "items",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
