//! SQLite storage backend using sqlx.
//!
//! Provides `SqliteSearchableRepository<E>` backed by a `sqlx::SqlitePool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag (enabled by default).
//!
//! # Schema
//!
//! Entities are stored in a shared `entities` table with common columns
//! (id, entity_type, name, created_at) and a JSON `data` column for
//! type-specific fields. Timestamps are stored as RFC 3339 text, which
//! sorts chronologically.

use crate::config::DatabaseConfig;
use crate::core::entity::EntityId;
use crate::core::error::RepositoryError;
use crate::core::repository::{Repository, RepositoryResult, SearchableRepository};
use crate::search::{SearchParams, SearchResult};
use crate::storage::sql::{
    ColumnOrderRegistry, Dialect, ENTITY_COLUMNS, EntityRow, SearchQuery, SqlMapping, SqlValue,
    count_to_total, extract_row, query_error, reconstruct_entity,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

const DIALECT: Dialect = Dialect::Sqlite;

/// Open a pool for the configured database, creating the file if needed
pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| query_error(DIALECT, "Invalid database url", e))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| query_error(DIALECT, "Failed to connect", e))?;

    tracing::info!(url = %config.url, "Connected to SQLite");
    Ok(pool)
}

/// Apply the required table and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> RepositoryResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS entities (
            id TEXT NOT NULL PRIMARY KEY,
            entity_type TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            name_folded TEXT NOT NULL DEFAULT '',
            data TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| query_error(DIALECT, "Failed to create entities table", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entities_type_name ON entities (entity_type, name)")
        .execute(pool)
        .await
        .map_err(|e| query_error(DIALECT, "Failed to create name index", e))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_entities_type_created ON entities (entity_type, created_at)",
    )
    .execute(pool)
    .await
    .map_err(|e| query_error(DIALECT, "Failed to create created_at index", e))?;

    Ok(())
}

/// Searchable repository backed by SQLite.
///
/// # Example
///
/// ```rust,ignore
/// let pool = catalog::storage::sqlite::connect(&config.database).await?;
/// catalog::storage::sqlite::ensure_schema(&pool).await?;
/// let repository = SqliteSearchableRepository::<Category>::new(pool);
/// let page = repository.search(&SearchParams::new()).await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteSearchableRepository<E> {
    pool: SqlitePool,
    order: Arc<ColumnOrderRegistry>,
    _marker: PhantomData<fn() -> E>,
}

impl<E> SqliteSearchableRepository<E> {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_order_registry(pool, ColumnOrderRegistry::with_defaults())
    }

    pub fn with_order_registry(pool: SqlitePool, order: ColumnOrderRegistry) -> Self {
        Self {
            pool,
            order: Arc::new(order),
            _marker: PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl<E: SqlMapping> Repository<E> for SqliteSearchableRepository<E> {
    async fn insert(&self, entity: E) -> RepositoryResult<()> {
        let row = extract_row(&entity)?;

        sqlx::query(
            "INSERT INTO entities (id, entity_type, name, name_folded, data, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.entity_type)
        .bind(&row.name)
        .bind(row.name_folded())
        .bind(&row.data)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error(DIALECT, "Failed to insert entity", e))?;

        Ok(())
    }

    async fn bulk_insert(&self, entities: Vec<E>) -> RepositoryResult<()> {
        let rows = entities
            .iter()
            .map(extract_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error(DIALECT, "Failed to begin transaction", e))?;

        for row in &rows {
            sqlx::query(
                "INSERT INTO entities (id, entity_type, name, name_folded, data, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&row.id)
            .bind(&row.entity_type)
            .bind(&row.name)
            .bind(row.name_folded())
            .bind(&row.data)
            .bind(row.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error(DIALECT, "Failed to insert entity", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| query_error(DIALECT, "Failed to commit bulk insert", e))?;

        tracing::debug!(
            entity_type = E::entity_type(),
            count = rows.len(),
            "Bulk inserted entities"
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &EntityId) -> RepositoryResult<Option<E>> {
        let sql = format!(
            "SELECT {} FROM entities WHERE id = ? AND entity_type = ?",
            ENTITY_COLUMNS
        );
        let row = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(id.to_string())
            .bind(E::entity_type())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error(DIALECT, "Failed to get entity", e))?;

        row.map(reconstruct_entity).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM entities WHERE entity_type = ? ORDER BY rowid",
            ENTITY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(E::entity_type())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(DIALECT, "Failed to list entities", e))?;

        rows.into_iter().map(reconstruct_entity).collect()
    }

    async fn update(&self, entity: E) -> RepositoryResult<()> {
        let row = extract_row(&entity)?;

        let result = sqlx::query(
            "UPDATE entities SET name = ?, name_folded = ?, data = ?, created_at = ? \
             WHERE id = ? AND entity_type = ?",
        )
        .bind(&row.name)
        .bind(row.name_folded())
        .bind(&row.data)
        .bind(row.created_at)
        .bind(&row.id)
        .bind(&row.entity_type)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error(DIALECT, "Failed to update entity", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(E::entity_type(), entity.id()));
        }

        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM entities WHERE id = ? AND entity_type = ?")
            .bind(id.to_string())
            .bind(E::entity_type())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error(DIALECT, "Failed to delete entity", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(E::entity_type(), id));
        }

        Ok(())
    }
}

#[async_trait]
impl<E: SqlMapping> SearchableRepository<E> for SqliteSearchableRepository<E> {
    async fn search(&self, params: &SearchParams<E::Filter>) -> RepositoryResult<SearchResult<E>> {
        let query = SearchQuery::build::<E>(DIALECT, &self.order, params);

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| query_error(DIALECT, "Failed to acquire connection", e))?;

        let mut count_query = sqlx::query_scalar::<_, i64>(&query.count_sql);
        for value in &query.binds {
            count_query = match value {
                SqlValue::Text(text) => count_query.bind(text.clone()),
                SqlValue::Integer(number) => count_query.bind(*number),
            };
        }
        let total = count_query
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| query_error(DIALECT, "Failed to count entities", e))?;

        let mut select_query = sqlx::query_as::<_, EntityRow>(&query.select_sql);
        for value in &query.binds {
            select_query = match value {
                SqlValue::Text(text) => select_query.bind(text.clone()),
                SqlValue::Integer(number) => select_query.bind(*number),
            };
        }
        let rows = select_query
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| query_error(DIALECT, "Failed to search entities", e))?;

        let items = rows
            .into_iter()
            .map(reconstruct_entity)
            .collect::<RepositoryResult<Vec<E>>>()?;

        tracing::debug!(
            entity_type = E::entity_type(),
            page = params.page(),
            limit = params.limit(),
            total,
            returned = items.len(),
            "SQLite search"
        );

        Ok(SearchResult::new(
            items,
            count_to_total(total),
            params.page(),
            params.limit(),
        ))
    }
}
