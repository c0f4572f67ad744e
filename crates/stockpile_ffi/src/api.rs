//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the item store to Dart via FRB through an explicit store handle.
//! - Translate raw UI strings (filters, sort keys, search modes) into core types.
//! - Fold every failure into a response envelope.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - There is no process-wide store; callers keep the handle from `store_open`.
//! - Drag steps stay in memory until `list_commit_order`.
//! - Any write other than a commit discards the pending drag session.

use log::{error, info, warn};
use stockpile_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Item, ItemFilter, ItemQuery, ItemSearch, ItemService, ReorderSession, RepoError, RepoResult,
    SortDirection, SortKey, SqliteItemRepository, StoreConfig, StoreWorker, WorkerError,
    UNSAVED_LIST_NAME,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Open item store owned by the Dart side.
///
/// Holds the background store worker plus the drag session in progress, if any.
#[flutter_rust_bridge::frb(opaque)]
#[derive(Debug)]
pub struct StoreHandle {
    worker: StoreWorker,
    pending_reorder: Mutex<Option<ReorderSession>>,
}

impl StoreHandle {
    fn pending(&self) -> MutexGuard<'_, Option<ReorderSession>> {
        self.pending_reorder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn discard_pending(&self, op: &str) {
        if self.pending().take().is_some_and(|session| session.has_moves()) {
            warn!("event=list_reorder module=ffi status=discarded op={op}");
        }
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Name of the working list the main screen edits.
#[flutter_rust_bridge::frb(sync)]
pub fn unsaved_list_name() -> String {
    UNSAVED_LIST_NAME.to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens (creating and migrating if needed) the store at `db_path`.
///
/// A blank path falls back to `STOCKPILE_DB_PATH`, then to the temp directory.
///
/// # FFI contract
/// - Sync call; opens the database and starts the store thread.
/// - Never panics; failures surface as an error message.
#[flutter_rust_bridge::frb(sync)]
pub fn store_open(db_path: String) -> Result<StoreHandle, String> {
    let path = match db_path.trim() {
        "" => StoreConfig::from_env().db_path,
        trimmed => PathBuf::from(trimmed),
    };
    match StoreWorker::open(&path) {
        Ok(worker) => {
            info!("event=store_open module=ffi status=ok");
            Ok(StoreHandle {
                worker,
                pending_reorder: Mutex::new(None),
            })
        }
        Err(err) => {
            error!("event=store_open module=ffi status=error");
            Err(format!("store_open failed: {err}"))
        }
    }
}

/// One item as shown by the list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub is_full: bool,
    pub sort_order: i64,
    pub list_name: String,
    /// Display state (`full|empty|leftover`).
    pub state: String,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        let state = item.state().as_str().to_string();
        Self {
            id: item.id,
            name: item.name,
            amount: item.amount,
            is_full: item.is_full,
            sort_order: item.order,
            list_name: item.list_name,
            state,
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the created or moved item.
    pub item_id: Option<i64>,
    /// Rows created, changed or deleted. `0` means nothing matched.
    pub affected: u64,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ItemActionResponse {
    fn success(message: impl Into<String>, item_id: Option<i64>, affected: usize) -> Self {
        Self {
            ok: true,
            item_id,
            affected: affected as u64,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_id: None,
            affected: 0,
            message: message.into(),
        }
    }

    fn from_count(op: &str, result: Result<usize, String>) -> Self {
        match result {
            Ok(0) => Self::success("No item matched.", None, 0),
            Ok(count) => Self::success(format!("{op}: {count} row(s)."), None, count),
            Err(message) => Self::failure(message),
        }
    }
}

/// Item list response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemListResponse {
    pub ok: bool,
    /// Items in display order (empty on failure).
    pub items: Vec<ItemView>,
    pub message: String,
}

impl ItemListResponse {
    fn from_items(result: Result<Vec<Item>, String>) -> Self {
        match result {
            Ok(items) => {
                let message = if items.is_empty() {
                    "No items.".to_string()
                } else {
                    format!("Found {} item(s).", items.len())
                };
                Self {
                    ok: true,
                    items: items.into_iter().map(ItemView::from).collect(),
                    message,
                }
            }
            Err(message) => Self {
                ok: false,
                items: Vec::new(),
                message,
            },
        }
    }
}

/// Saved list names response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNamesResponse {
    pub ok: bool,
    pub names: Vec<String>,
    pub message: String,
}

/// Adds an item from the add dialog to the end of `list_name`.
///
/// `amount` is the raw text field; blank means `0`.
#[flutter_rust_bridge::frb(sync)]
pub fn item_add(
    handle: &StoreHandle,
    list_name: String,
    name: String,
    amount: String,
) -> ItemActionResponse {
    match write(handle, "item_add", move |service| {
        service.add_item(&list_name, &name, &amount)
    }) {
        Ok(id) => ItemActionResponse::success("Item added.", Some(id), 1),
        Err(message) => ItemActionResponse::failure(message),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn item_rename(handle: &StoreHandle, item_id: i64, name: String) -> ItemActionResponse {
    let result = write(handle, "item_rename", move |service| {
        service.rename_item(item_id, &name)
    });
    ItemActionResponse::from_count("Renamed", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn item_set_amount(handle: &StoreHandle, item_id: i64, amount: String) -> ItemActionResponse {
    let result = write(handle, "item_set_amount", move |service| {
        service.set_amount(item_id, &amount)
    });
    ItemActionResponse::from_count("Amount updated", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn item_toggle_full(handle: &StoreHandle, item_id: i64) -> ItemActionResponse {
    let result = write(handle, "item_toggle_full", move |service| {
        service.toggle_full(item_id)
    });
    ItemActionResponse::from_count("Toggled", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn item_delete(handle: &StoreHandle, item_id: i64) -> ItemActionResponse {
    let result = write(handle, "item_delete", move |service| {
        service.delete_item(item_id)
    });
    ItemActionResponse::from_count("Deleted", result)
}

/// Bulk-deletes items of `list_name` matching `filter` (`all|empty|leftover|full`).
#[flutter_rust_bridge::frb(sync)]
pub fn items_clear(handle: &StoreHandle, list_name: String, filter: String) -> ItemActionResponse {
    let filter = match parse_filter(&filter) {
        Ok(filter) => filter,
        Err(message) => return ItemActionResponse::failure(message),
    };
    let result = write(handle, "items_clear", move |service| {
        service.clear(&list_name, filter)
    });
    ItemActionResponse::from_count("Cleared", result)
}

/// Lists one list filtered by state and sorted by `order|name|amount`.
#[flutter_rust_bridge::frb(sync)]
pub fn items_query(
    handle: &StoreHandle,
    list_name: String,
    filter: String,
    sort_key: String,
    descending: bool,
) -> ItemListResponse {
    let query = match build_query(list_name, &filter, &sort_key, descending) {
        Ok(query) => query,
        Err(message) => return ItemListResponse::from_items(Err(message)),
    };
    ItemListResponse::from_items(run(handle, "items_query", move |service| {
        service.list_items(&query)
    }))
}

/// Searches one list.
///
/// `mode` is `exact`, `keyword` or `amount`; for `amount`, `text` is a
/// comparison such as `<= 2`.
#[flutter_rust_bridge::frb(sync)]
pub fn items_search(
    handle: &StoreHandle,
    list_name: String,
    mode: String,
    text: String,
) -> ItemListResponse {
    let search = match parse_search(&mode, &text) {
        Ok(search) => search,
        Err(message) => return ItemListResponse::from_items(Err(message)),
    };
    ItemListResponse::from_items(run(handle, "items_search", move |service| {
        service.search(&list_name, &search)
    }))
}

/// Names of saved lists, excluding the working list.
#[flutter_rust_bridge::frb(sync)]
pub fn list_names(handle: &StoreHandle) -> ListNamesResponse {
    match run(handle, "list_names", |service| service.list_names()) {
        Ok(names) => ListNamesResponse {
            ok: true,
            message: format!("Found {} list(s).", names.len()),
            names,
        },
        Err(message) => ListNamesResponse {
            ok: false,
            names: Vec::new(),
            message,
        },
    }
}

/// Saves the working list under `name`, replacing a list of that name.
#[flutter_rust_bridge::frb(sync)]
pub fn list_save_as(handle: &StoreHandle, name: String) -> ItemActionResponse {
    match write(handle, "list_save_as", move |service| {
        service.save_working_list_as(&name)
    }) {
        Ok(count) => ItemActionResponse::success("List saved.", None, count),
        Err(message) => ItemActionResponse::failure(message),
    }
}

/// Replaces the working list with a copy of the saved list `name`.
#[flutter_rust_bridge::frb(sync)]
pub fn list_load(handle: &StoreHandle, name: String) -> ItemActionResponse {
    match write(handle, "list_load", move |service| {
        service.load_list_into_working(&name)
    }) {
        Ok(count) => ItemActionResponse::success("List loaded.", None, count),
        Err(message) => ItemActionResponse::failure(message),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn list_delete(handle: &StoreHandle, name: String) -> ItemActionResponse {
    let result = write(handle, "list_delete", move |service| service.delete_list(&name));
    ItemActionResponse::from_count("List deleted", result)
}

/// Moves one item to the end of `target`. The moved item gets a new id.
#[flutter_rust_bridge::frb(sync)]
pub fn item_move_to_list(handle: &StoreHandle, item_id: i64, target: String) -> ItemActionResponse {
    match write(handle, "item_move_to_list", move |service| {
        service.move_item_to_list(item_id, &target)
    }) {
        Ok(Some(new_id)) => ItemActionResponse::success("Item moved.", Some(new_id), 1),
        Ok(None) => ItemActionResponse::success("No item matched.", None, 0),
        Err(message) => ItemActionResponse::failure(message),
    }
}

/// Applies one drag step to `list_name` in memory and returns the new order.
///
/// The first step snapshots the list; a step on another list discards the
/// uncommitted session of the previous one. Any other write discards it too,
/// so the next step snapshots the list afresh.
#[flutter_rust_bridge::frb(sync)]
pub fn list_reorder(handle: &StoreHandle, list_name: String, from: u32, to: u32) -> ItemListResponse {
    let mut pending = handle.pending();
    let stale = pending
        .as_ref()
        .map_or(true, |session| session.list_name() != list_name);
    if stale {
        if pending.take().is_some_and(|session| session.has_moves()) {
            warn!("event=list_reorder module=ffi status=discarded op=list_reorder");
        }
        let snapshot_list = list_name.clone();
        match run(handle, "list_reorder", move |service| {
            service.begin_reorder(&snapshot_list)
        }) {
            Ok(session) => *pending = Some(session),
            Err(message) => return ItemListResponse::from_items(Err(message)),
        }
    }

    let Some(session) = pending.as_mut() else {
        return ItemListResponse::from_items(Err("list_reorder failed: no session".to_string()));
    };
    let result = session
        .move_item(from as usize, to as usize)
        .map(|()| session.items().to_vec())
        .map_err(|err| format!("list_reorder failed: {err}"));
    ItemListResponse::from_items(result)
}

/// Persists the drag session in one bulk update.
///
/// Without a pending session this succeeds with `affected = 0`.
#[flutter_rust_bridge::frb(sync)]
pub fn list_commit_order(handle: &StoreHandle) -> ItemActionResponse {
    let Some(session) = handle.pending().take() else {
        return ItemActionResponse::success("Nothing to commit.", None, 0);
    };
    match run(handle, "list_commit_order", move |service| {
        service.finish_reorder(session)
    }) {
        Ok(changed) => ItemActionResponse::success("Order saved.", None, changed),
        Err(message) => ItemActionResponse::failure(message),
    }
}

fn run<T, F>(handle: &StoreHandle, op: &'static str, f: F) -> Result<T, String>
where
    F: FnOnce(&ItemService<SqliteItemRepository<'_>>) -> RepoResult<T> + Send + 'static,
    T: Send + 'static,
{
    handle.worker.with_items(f).map_err(|err| {
        match &err {
            WorkerError::Job(RepoError::Validation(_)) => {
                warn!("event=ffi_call module=ffi status=rejected op={op}");
            }
            _ => error!("event=ffi_call module=ffi status=error op={op}"),
        }
        format!("{op} failed: {err}")
    })
}

/// Runs a write after dropping the drag snapshot it would invalidate.
fn write<T, F>(handle: &StoreHandle, op: &'static str, f: F) -> Result<T, String>
where
    F: FnOnce(&ItemService<SqliteItemRepository<'_>>) -> RepoResult<T> + Send + 'static,
    T: Send + 'static,
{
    handle.discard_pending(op);
    run(handle, op, f)
}

fn parse_filter(raw: &str) -> Result<ItemFilter, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "all" | "none" => Ok(ItemFilter::All),
        "empty" => Ok(ItemFilter::Empty),
        "leftover" => Ok(ItemFilter::Leftover),
        "full" => Ok(ItemFilter::Full),
        other => Err(format!(
            "unsupported filter `{other}`; expected all|empty|leftover|full"
        )),
    }
}

fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "order" => Ok(SortKey::Order),
        "name" => Ok(SortKey::Name),
        "amount" => Ok(SortKey::Amount),
        other => Err(format!(
            "unsupported sort key `{other}`; expected order|name|amount"
        )),
    }
}

fn build_query(
    list_name: String,
    filter: &str,
    sort_key: &str,
    descending: bool,
) -> Result<ItemQuery, String> {
    let direction = if descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    Ok(ItemQuery::new(list_name)
        .filter(parse_filter(filter)?)
        .sort_by(parse_sort_key(sort_key)?, direction))
}

fn parse_search(mode: &str, text: &str) -> Result<ItemSearch, String> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "exact" => Ok(ItemSearch::ExactName {
            name: text.to_string(),
        }),
        "keyword" => Ok(ItemSearch::Keyword {
            keyword: text.to_string(),
        }),
        "amount" => {
            ItemSearch::parse_amount(text).map_err(|err| format!("items_search failed: {err}"))
        }
        other => Err(format!(
            "unsupported search mode `{other}`; expected exact|keyword|amount"
        )),
    }
}
