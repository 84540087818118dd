//! Item use-case service.
//!
//! Items are owned by the host; this service exists for seeding tools and
//! for hosts that keep their content in the bundled SQLite store.

use crate::model::item::{Item, ItemId, ItemStatus};
use crate::repo::item_repo::{ItemListQuery, ItemRepository, RepoError, RepoResult};

/// Use-case service wrapper for item CRUD operations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a draft item and returns its id.
    pub fn create_draft(&self, title: impl AsRef<str>) -> RepoResult<ItemId> {
        self.repo.create_item(title.as_ref(), ItemStatus::Draft)
    }

    /// Creates an item with an explicit status.
    pub fn create_item(&self, title: impl AsRef<str>, status: ItemStatus) -> RepoResult<ItemId> {
        self.repo.create_item(title.as_ref(), status)
    }

    /// Marks an existing draft (or any state) as published.
    pub fn publish(&self, id: ItemId) -> RepoResult<Item> {
        self.set_status(id, ItemStatus::Publish)
    }

    /// Updates title and status of an existing item.
    ///
    /// Returns `ItemNotFound` unchanged from the repository.
    pub fn update_item(&self, item: &Item) -> RepoResult<()> {
        self.repo.update_item(item)
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo.get_item(id)
    }

    pub fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>> {
        self.repo.list_items(query)
    }

    /// Moves an item to trash. Its series link and order value are kept.
    pub fn trash_item(&self, id: ItemId) -> RepoResult<()> {
        self.repo.trash_item(id)
    }

    fn set_status(&self, id: ItemId, status: ItemStatus) -> RepoResult<Item> {
        let mut item = self.repo.get_item(id)?.ok_or(RepoError::ItemNotFound(id))?;
        item.status = status;
        self.repo.update_item(&item)?;
        Ok(item)
    }
}
