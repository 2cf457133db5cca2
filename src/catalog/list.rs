//! List use cases: raw list input → search params → paginated output

use crate::catalog::cast_member::{CastMember, CastMemberType};
use crate::catalog::category::Category;
use crate::core::entity::EntityId;
use crate::core::error::RepositoryError;
use crate::core::repository::SearchableRepository;
use crate::search::{SearchInput, SearchParams, SearchResult, Searchable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Raw list request, as decoded from a query string.
///
/// `sort` may be a field name (paired with `sort_dir`) or already a
/// criterion object / array of criteria.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListInput {
    pub page: Value,
    pub per_page: Value,
    pub sort: Value,
    pub sort_dir: Value,
    pub filter: Value,
}

impl ListInput {
    pub fn into_search_input(self) -> SearchInput {
        let sort_criteria = match self.sort {
            Value::String(field) if !field.is_empty() => serde_json::json!({
                "field": field,
                "direction": self.sort_dir,
            }),
            other => other,
        };

        SearchInput {
            page: self.page,
            limit: self.per_page,
            sort_criteria,
            filter: self.filter,
        }
    }
}

/// Paginated list response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationOutput<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub current_page: usize,
    pub last_page: usize,
    pub per_page: usize,
}

impl<E, T: From<E>> From<SearchResult<E>> for PaginationOutput<T> {
    fn from(result: SearchResult<E>) -> Self {
        let result = result.map_items(T::from);
        Self {
            items: result.items,
            total: result.total,
            current_page: result.current_page,
            last_page: result.last_page,
            per_page: result.limit,
        }
    }
}

/// Errors a list use case can report
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// The filter was rejected by its own rules
    #[error(transparent)]
    InvalidInput(#[from] crate::core::error::ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Generic list use case over any searchable repository
pub struct ListUseCase<E: Searchable, O> {
    repository: Arc<dyn SearchableRepository<E>>,
    _output: PhantomData<fn() -> O>,
}

impl<E: Searchable, O: From<E>> ListUseCase<E, O> {
    pub fn new(repository: Arc<dyn SearchableRepository<E>>) -> Self {
        Self {
            repository,
            _output: PhantomData,
        }
    }

    pub async fn execute(&self, input: ListInput) -> Result<PaginationOutput<O>, ListError> {
        let params = SearchParams::<E::Filter>::from_input(input.into_search_input())?;
        tracing::debug!(
            entity_type = E::entity_type(),
            page = params.page(),
            limit = params.limit(),
            sort = %params.sort_criteria_value(),
            "Listing entities"
        );

        let result = self.repository.search(&params).await?;
        Ok(result.into())
    }
}

/// Category as exposed by list responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOutput {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryOutput {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            is_active: category.is_active,
            created_at: category.created_at,
        }
    }
}

/// Cast member as exposed by list responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastMemberOutput {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub member_type: CastMemberType,
    pub created_at: DateTime<Utc>,
}

impl From<CastMember> for CastMemberOutput {
    fn from(member: CastMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            member_type: member.member_type,
            created_at: member.created_at,
        }
    }
}

pub type ListCategories = ListUseCase<Category, CategoryOutput>;
pub type ListCastMembers = ListUseCase<CastMember, CastMemberOutput>;
