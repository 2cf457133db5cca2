//! In-memory searchable repository for testing and development

use crate::core::entity::EntityId;
use crate::core::error::RepositoryError;
use crate::core::repository::{Repository, RepositoryResult, SearchableRepository};
use crate::search::{
    SearchParams, SearchResult, Searchable, apply_filter, apply_pagination, apply_sort,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};

/// In-memory repository keeping entities in insertion order.
///
/// Uses RwLock for thread-safe access; clones share the same storage.
/// Searching snapshots the stored items and runs the filter → sort →
/// paginate pipeline over the snapshot.
#[derive(Clone)]
pub struct InMemorySearchableRepository<E: Searchable> {
    items: Arc<RwLock<IndexMap<EntityId, E>>>,
}

impl<E: Searchable> InMemorySearchableRepository<E> {
    /// Create a new, empty repository
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Create a repository pre-filled with `entities`
    pub fn with_items(entities: impl IntoIterator<Item = E>) -> Self {
        let items = entities.into_iter().map(|e| (e.id(), e)).collect();
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    fn snapshot(&self) -> RepositoryResult<Vec<E>> {
        let items = self
            .items
            .read()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        Ok(items.values().cloned().collect())
    }

    /// Sort stage used by `search`: the entity's default ordering applies
    /// only when the caller supplied no criteria at all
    pub fn apply_sort(&self, items: Vec<E>, params: &SearchParams<E::Filter>) -> Vec<E> {
        if params.has_sort() {
            apply_sort(items, params.sort_criteria())
        } else {
            apply_sort(items, &E::default_sort())
        }
    }
}

impl<E: Searchable> Default for InMemorySearchableRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Searchable> Repository<E> for InMemorySearchableRepository<E> {
    async fn insert(&self, entity: E) -> RepositoryResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        items.insert(entity.id(), entity);

        Ok(())
    }

    async fn bulk_insert(&self, entities: Vec<E>) -> RepositoryResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        items.extend(entities.into_iter().map(|e| (e.id(), e)));

        Ok(())
    }

    async fn find_by_id(&self, id: &EntityId) -> RepositoryResult<Option<E>> {
        let items = self
            .items
            .read()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        Ok(items.get(id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        self.snapshot()
    }

    async fn update(&self, entity: E) -> RepositoryResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        let slot = items
            .get_mut(&entity.id())
            .ok_or_else(|| RepositoryError::not_found(E::entity_type(), entity.id()))?;
        *slot = entity;

        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> RepositoryResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        // shift_remove keeps the insertion order of the remaining items
        items
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(E::entity_type(), id))
    }
}

#[async_trait]
impl<E: Searchable> SearchableRepository<E> for InMemorySearchableRepository<E> {
    async fn search(&self, params: &SearchParams<E::Filter>) -> RepositoryResult<SearchResult<E>> {
        let items = self.snapshot()?;

        let filtered = apply_filter(items, params.filter());
        let total = filtered.len();
        let sorted = self.apply_sort(filtered, params);
        let page = apply_pagination(sorted, params.page(), params.limit());

        tracing::debug!(
            entity_type = E::entity_type(),
            page = params.page(),
            limit = params.limit(),
            total,
            returned = page.len(),
            "In-memory search"
        );

        Ok(SearchResult::new(page, total, params.page(), params.limit()))
    }
}
