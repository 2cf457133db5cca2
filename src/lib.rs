//! # Catalog Search
//!
//! Domain model and generic search engine for a content-catalog admin.
//!
//! ## Features
//!
//! - **Search parameters**: page, limit, sort criteria and filter coerced
//!   from loosely-typed client input, with safe defaults
//! - **Multi-field sorting**: ordered criteria over an allow-list of fields,
//!   with optional per-criterion value transforms
//! - **Repositories**: an in-memory filter → sort → paginate pipeline and
//!   SQL-backed repositories (SQLite, MySQL) with the same contract
//! - **Aggregates**: categories and cast members, validated on creation
//!   and re-validated when loaded from storage
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! let repository = InMemorySearchableRepository::<Category>::new();
//! repository.insert(Category::new("Movie", None, true)?).await?;
//!
//! let params = SearchParams::from_value(&serde_json::json!({
//!     "page": "1",
//!     "limit": 10,
//!     "sort_criteria": {"field": "name", "direction": "asc"},
//!     "filter": "mov",
//! }))?;
//! let page = repository.search(&params).await?;
//! assert_eq!(page.total, 1);
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod search;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::{Entity, EntityId},
        error::{FieldValidationError, RepositoryError, ValidationError},
        field::FieldValue,
        notification::Notification,
        repository::{Repository, RepositoryResult, SearchableRepository},
    };

    // === Search ===
    pub use crate::search::{
        SearchFilter, SearchInput, SearchParams, SearchResult, Searchable, SortCriterion,
        SortDirection, SortField, SortTransform,
    };

    // === Catalog ===
    pub use crate::catalog::{
        CastMember, CastMemberFilter, CastMemberType, Category, ListCastMembers, ListCategories,
        ListInput, PaginationOutput,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemorySearchableRepository;
    #[cfg(feature = "mysql")]
    pub use crate::storage::MysqlSearchableRepository;
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteSearchableRepository;
    pub use crate::storage::{ColumnOrderRegistry, ColumnOrderStrategy, SqlMapping};

    // === Config ===
    pub use crate::config::{CatalogConfig, DatabaseConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
