//! Repository traits for aggregates
//!
//! Implementations provide storage for a specific entity type. The search
//! contract is the same whether items live in memory or in a relational
//! store.

use crate::core::entity::{Entity, EntityId};
use crate::core::error::RepositoryError;
use crate::search::{SearchParams, SearchResult, Searchable};
use async_trait::async_trait;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Basic persistence for an aggregate
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Store a new entity
    async fn insert(&self, entity: E) -> RepositoryResult<()>;

    /// Store several entities, preserving their order
    async fn bulk_insert(&self, entities: Vec<E>) -> RepositoryResult<()>;

    /// Get an entity by ID
    async fn find_by_id(&self, id: &EntityId) -> RepositoryResult<Option<E>>;

    /// List all entities
    async fn find_all(&self) -> RepositoryResult<Vec<E>>;

    /// Replace an existing entity; `NotFound` if it is not stored
    async fn update(&self, entity: E) -> RepositoryResult<()>;

    /// Remove an entity; `NotFound` if it is not stored
    async fn delete(&self, id: &EntityId) -> RepositoryResult<()>;
}

/// A repository that can filter, sort and paginate its aggregates
#[async_trait]
pub trait SearchableRepository<E: Searchable>: Repository<E> {
    /// The fields clients may sort by
    fn sortable_fields(&self) -> Vec<&'static str> {
        E::sortable_fields()
    }

    /// Run one search request
    async fn search(&self, params: &SearchParams<E::Filter>) -> RepositoryResult<SearchResult<E>>;
}
