//! Core domain logic for Stockpile.
//! This crate owns item storage, list ordering and every business invariant.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod repo;
pub mod search;
pub mod service;
pub mod worker;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{
    normalize_list_name, parse_amount, Item, ItemId, ItemState, ItemValidationError, NewItem,
    UNSAVED_LIST_NAME,
};
pub use reorder::{normalize_orders, reorder, ReorderError};
pub use repo::item_repo::{
    ItemFilter, ItemQuery, ItemRepository, RepoError, RepoResult, SortDirection, SortKey,
    SqliteItemRepository,
};
pub use search::item_search::{AmountComparison, ItemSearch, SearchParseError};
pub use service::item_service::ItemService;
pub use service::reorder_session::ReorderSession;
pub use worker::{StoreWorker, WorkerError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
