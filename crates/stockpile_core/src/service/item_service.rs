//! Item use-case service.
//!
//! # Responsibility
//! - Provide the item store operations front ends call.
//! - Parse and validate raw user input (names, amounts, list names).
//! - Own list-level flows: save the working list, load a saved list, move items.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Edits on a missing item report `0` rows affected.
//! - Item names never appear in log events.

use crate::model::item::{
    normalize_list_name, normalize_name, parse_amount, Item, ItemId, NewItem, UNSAVED_LIST_NAME,
};
use crate::repo::item_repo::{ItemFilter, ItemQuery, ItemRepository, RepoError, RepoResult};
use crate::search::item_search::ItemSearch;
use crate::service::reorder_session::ReorderSession;
use log::{info, warn};

/// Use-case service wrapper for the item store.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds an item from raw dialog input to the end of `list_name`.
    ///
    /// # Contract
    /// - `name` is trimmed and must not be blank.
    /// - `amount` is parsed as a number; blank means `0`.
    /// - Nothing is written when either check fails.
    pub fn add_item(&self, list_name: &str, name: &str, amount: &str) -> RepoResult<ItemId> {
        let draft = parse_draft(list_name, name, amount).inspect_err(log_rejected)?;
        self.create_item(&draft)
    }

    /// Creates an already-typed item.
    pub fn create_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        let id = self.repo.create_item(item).inspect_err(log_rejected)?;
        info!(
            "event=item_create module=service status=ok item_id={id} list_kind={}",
            list_kind(&item.list_name)
        );
        Ok(id)
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo.get_item(id)
    }

    /// Renames one item.
    pub fn rename_item(&self, id: ItemId, name: &str) -> RepoResult<usize> {
        let name = normalize_name(name)
            .map_err(RepoError::from)
            .inspect_err(log_rejected)?;
        self.edit(id, "item_rename", |item| item.name = name)
    }

    /// Replaces the amount of one item from raw input.
    pub fn set_amount(&self, id: ItemId, amount: &str) -> RepoResult<usize> {
        let amount = parse_amount(amount)
            .map_err(RepoError::from)
            .inspect_err(log_rejected)?;
        self.edit(id, "item_set_amount", |item| item.amount = amount)
    }

    /// Flips the "topped off" marker of one item.
    pub fn toggle_full(&self, id: ItemId) -> RepoResult<usize> {
        self.edit(id, "item_toggle_full", |item| item.is_full = !item.is_full)
    }

    /// Overwrites the given items by id.
    pub fn update_items(&self, items: &[Item]) -> RepoResult<usize> {
        let changed = self.repo.update_items(items)?;
        info!(
            "event=items_update module=service status=ok requested={} changed={changed}",
            items.len()
        );
        Ok(changed)
    }

    pub fn delete_item(&self, id: ItemId) -> RepoResult<usize> {
        let changed = self.repo.delete_item(id)?;
        info!("event=item_delete module=service status=ok item_id={id} changed={changed}");
        Ok(changed)
    }

    /// Bulk-deletes the items of `list_name` matching `filter`.
    pub fn clear(&self, list_name: &str, filter: ItemFilter) -> RepoResult<usize> {
        let deleted = self.repo.delete_where(list_name, filter)?;
        info!(
            "event=items_clear module=service status=ok filter={filter:?} deleted={deleted} list_kind={}",
            list_kind(list_name)
        );
        Ok(deleted)
    }

    pub fn list_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>> {
        self.repo.query_items(query)
    }

    pub fn search(&self, list_name: &str, search: &ItemSearch) -> RepoResult<Vec<Item>> {
        self.repo.search_items(list_name, search)
    }

    /// Names of saved lists. The working list is never included.
    pub fn list_names(&self) -> RepoResult<Vec<String>> {
        self.repo.list_names()
    }

    /// Saves the working list under `name`, replacing any list of that name.
    pub fn save_working_list_as(&self, name: &str) -> RepoResult<usize> {
        let target = checked_list_name(name)?;
        let copied = self.repo.copy_list(UNSAVED_LIST_NAME, &target)?;
        info!("event=list_save module=service status=ok copied={copied}");
        Ok(copied)
    }

    /// Replaces the working list with a copy of the saved list `name`.
    pub fn load_list_into_working(&self, name: &str) -> RepoResult<usize> {
        let source = checked_list_name(name)?;
        let copied = self.repo.copy_list(&source, UNSAVED_LIST_NAME)?;
        info!("event=list_load module=service status=ok copied={copied}");
        Ok(copied)
    }

    /// Deletes a saved list and all of its items.
    pub fn delete_list(&self, name: &str) -> RepoResult<usize> {
        let name = checked_list_name(name)?;
        let deleted = self.repo.delete_list(&name)?;
        info!("event=list_delete module=service status=ok deleted={deleted}");
        Ok(deleted)
    }

    /// Moves one item to the end of `target` under a fresh id.
    ///
    /// Returns `None` when the item does not exist.
    pub fn move_item_to_list(&self, id: ItemId, target: &str) -> RepoResult<Option<ItemId>> {
        let target = if target == UNSAVED_LIST_NAME {
            target.to_string()
        } else {
            checked_list_name(target)?
        };
        let moved = self.repo.move_to_list(id, &target)?;
        info!(
            "event=item_move module=service status=ok item_id={id} new_item_id={} list_kind={}",
            moved.map_or_else(|| "none".to_string(), |value| value.to_string()),
            list_kind(&target)
        );
        Ok(moved)
    }

    /// Snapshots `list_name` in display order for a drag gesture.
    pub fn begin_reorder(&self, list_name: &str) -> RepoResult<ReorderSession> {
        let items = self.repo.query_items(&ItemQuery::new(list_name))?;
        Ok(ReorderSession::new(list_name, items))
    }

    /// Persists a finished drag gesture.
    pub fn finish_reorder(&self, session: ReorderSession) -> RepoResult<usize> {
        let changed = session.finish(&self.repo)?;
        info!("event=list_reorder module=service status=ok changed={changed}");
        Ok(changed)
    }

    fn edit(
        &self,
        id: ItemId,
        event: &'static str,
        apply: impl FnOnce(&mut Item),
    ) -> RepoResult<usize> {
        let Some(mut item) = self.repo.get_item(id)? else {
            info!("event={event} module=service status=ok item_id={id} changed=0");
            return Ok(0);
        };
        apply(&mut item);
        let changed = self.repo.update_item(&item)?;
        info!("event={event} module=service status=ok item_id={id} changed={changed}");
        Ok(changed)
    }
}

fn parse_draft(list_name: &str, name: &str, amount: &str) -> RepoResult<NewItem> {
    let name = normalize_name(name)?;
    let amount = parse_amount(amount)?;
    Ok(NewItem::new(list_name, name).with_amount(amount))
}

fn checked_list_name(name: &str) -> RepoResult<String> {
    normalize_list_name(name)
        .map_err(RepoError::from)
        .inspect_err(log_rejected)
}

fn log_rejected(err: &RepoError) {
    if let RepoError::Validation(reason) = err {
        warn!("event=item_validate module=service status=rejected reason=\"{reason}\"");
    }
}

fn list_kind(list_name: &str) -> &'static str {
    if list_name == UNSAVED_LIST_NAME {
        "unsaved"
    } else {
        "named"
    }
}
