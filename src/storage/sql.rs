//! Backend-neutral pieces of the SQL searchable repositories
//!
//! Entities are stored in a shared `entities` table with common columns
//! (id, entity_type, name, created_at) and a JSON `data` column for
//! type-specific fields.
//!
//! A search is pushed down into two statements built by [`SearchQuery`]:
//! a `COUNT(*)` over the filtered rows and a bounded, ordered page query.
//! Sort fields are only ever interpolated after passing the entity's
//! allow-list; every user-supplied value is bound.

use crate::core::error::{RepositoryError, ValidationError};
use crate::search::{SearchParams, Searchable, SortCriterion, SortDirection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Dialects and column ordering
// ---------------------------------------------------------------------------

/// Relational store flavours the adapter can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    MySql,
}

impl Dialect {
    /// Identifier used to resolve per-store overrides
    pub fn id(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "SQLite",
            Dialect::MySql => "MySQL",
        }
    }
}

/// Renders the expression a column is ordered by
pub trait ColumnOrderStrategy: Send + Sync {
    fn order_expr(&self, column: &str) -> String;
}

/// Order by the column as stored, using the store's default collation
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainColumn;

impl ColumnOrderStrategy for PlainColumn {
    fn order_expr(&self, column: &str) -> String {
        column.to_string()
    }
}

/// Byte-wise, case-sensitive ordering on stores whose default collation
/// ignores case
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCollation;

impl ColumnOrderStrategy for BinaryCollation {
    fn order_expr(&self, column: &str) -> String {
        format!("CAST({} AS BINARY)", column)
    }
}

/// Per-store, per-field ordering overrides.
///
/// Fields without an override fall back to [`PlainColumn`].
#[derive(Clone, Default)]
pub struct ColumnOrderRegistry {
    overrides: HashMap<(String, String), Arc<dyn ColumnOrderStrategy>>,
}

impl ColumnOrderRegistry {
    /// An empty registry: every field orders by its plain column
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in overrides (`mysql`: `name` is ordered
    /// byte-wise so ordering matches the in-memory repository)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Dialect::MySql.id(), "name", BinaryCollation);
        registry
    }

    pub fn register(
        &mut self,
        store: impl Into<String>,
        field: impl Into<String>,
        strategy: impl ColumnOrderStrategy + 'static,
    ) -> &mut Self {
        self.overrides
            .insert((store.into(), field.into()), Arc::new(strategy));
        self
    }

    pub fn order_expr(&self, store: &str, field: &str, column: &str) -> String {
        match self.overrides.get(&(store.to_string(), field.to_string())) {
            Some(strategy) => strategy.order_expr(column),
            None => PlainColumn.order_expr(column),
        }
    }
}

impl fmt::Debug for ColumnOrderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.overrides.keys().collect();
        keys.sort();
        f.debug_struct("ColumnOrderRegistry")
            .field("overrides", &keys)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Mapping and predicates
// ---------------------------------------------------------------------------

/// A value bound into a query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

/// A filter condition pushed down to the store
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring match on a common column
    ContainsIgnoreCase { column: &'static str, needle: String },

    /// Equality on a field of the JSON `data` column (`$.field` path)
    JsonEquals { path: &'static str, value: SqlValue },
}

/// Common entity fields stored in dedicated columns (excluded from JSON data)
pub const ENTITY_COMMON_FIELDS: &[&str] = &["id", "name", "created_at"];

/// Columns selected for every entity row
pub const ENTITY_COLUMNS: &str = "id, entity_type, name, data, created_at";

/// Common columns stored alongside a case-folded copy, used by
/// case-insensitive predicates. Store-side `LOWER()` only folds ASCII on
/// some backends, so the fold is computed once with [`fold_case`].
pub const FOLDED_COLUMNS: &[(&str, &str)] = &[("name", "name_folded")];

/// Case folding shared by the stored folded columns and filter needles
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn folded_expr(column: &str) -> String {
    FOLDED_COLUMNS
        .iter()
        .find(|(plain, _)| *plain == column)
        .map(|(_, folded)| folded.to_string())
        .unwrap_or_else(|| format!("LOWER({})", column))
}

/// How an aggregate maps onto the shared `entities` table
pub trait SqlMapping: Searchable + Serialize + DeserializeOwned {
    /// Column backing a sortable field, if the store can order by it
    fn sort_column(field: &str) -> Option<&'static str> {
        match field {
            "name" => Some("name"),
            "created_at" => Some("created_at"),
            _ => None,
        }
    }

    /// Translate a filter into store predicates (all must hold)
    fn filter_predicates(filter: &Self::Filter) -> Vec<Predicate>;
}

// ---------------------------------------------------------------------------
// Query building
// ---------------------------------------------------------------------------

/// Count and page statements for one search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub count_sql: String,
    pub select_sql: String,
    /// Values for the WHERE clause, shared by both statements
    pub binds: Vec<SqlValue>,
    pub limit: i64,
    pub offset: i64,
}

impl SearchQuery {
    pub fn build<E: SqlMapping>(
        dialect: Dialect,
        registry: &ColumnOrderRegistry,
        params: &SearchParams<E::Filter>,
    ) -> Self {
        let mut conditions = vec!["entity_type = ?".to_string()];
        let mut binds = vec![SqlValue::Text(E::entity_type().to_string())];

        if let Some(filter) = params.filter() {
            for predicate in E::filter_predicates(filter) {
                let (condition, values) = render_predicate(dialect, predicate);
                conditions.push(condition);
                binds.extend(values);
            }
        }

        let where_clause = conditions.join(" AND ");
        let order_by = order_by_clause::<E>(dialect, registry, params.sort_criteria());

        let count_sql = format!("SELECT COUNT(*) FROM entities WHERE {}", where_clause);
        let select_sql = format!(
            "SELECT {} FROM entities WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
            ENTITY_COLUMNS, where_clause, order_by
        );

        Self {
            count_sql,
            select_sql,
            binds,
            limit: i64::try_from(params.limit()).unwrap_or(i64::MAX),
            offset: i64::try_from(params.offset()).unwrap_or(i64::MAX),
        }
    }
}

fn render_predicate(dialect: Dialect, predicate: Predicate) -> (String, Vec<SqlValue>) {
    match predicate {
        Predicate::ContainsIgnoreCase { column, needle } => (
            format!("{} LIKE ? ESCAPE '!'", folded_expr(column)),
            vec![SqlValue::Text(format!("%{}%", escape_like(&fold_case(&needle))))],
        ),
        Predicate::JsonEquals { path, value } => {
            let expr = match (dialect, &value) {
                (Dialect::Sqlite, _) => "json_extract(data, ?)",
                (Dialect::MySql, SqlValue::Text(_)) => "JSON_UNQUOTE(JSON_EXTRACT(data, ?))",
                (Dialect::MySql, SqlValue::Integer(_)) => "JSON_EXTRACT(data, ?)",
            };
            (
                format!("{} = ?", expr),
                vec![SqlValue::Text(path.to_string()), value],
            )
        }
    }
}

/// Escape LIKE wildcards so filter text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}

fn order_by_clause<E: SqlMapping>(
    dialect: Dialect,
    registry: &ColumnOrderRegistry,
    criteria: &[SortCriterion],
) -> String {
    let mut terms = render_order_terms::<E>(dialect, registry, criteria);

    if terms.is_empty() {
        terms = render_order_terms::<E>(dialect, registry, &E::default_sort());
    }

    // Rows tying on every criterion keep a stable order across pages
    terms.push(format!("id {}", SortDirection::Asc.as_sql()));
    terms.join(", ")
}

fn render_order_terms<E: SqlMapping>(
    dialect: Dialect,
    registry: &ColumnOrderRegistry,
    criteria: &[SortCriterion],
) -> Vec<String> {
    criteria
        .iter()
        .filter(|criterion| criterion.is_valid())
        .filter(|criterion| E::sort_field(&criterion.field).is_some())
        .filter_map(|criterion| {
            let column = E::sort_column(&criterion.field)?;
            if criterion.transform.is_some() {
                tracing::debug!(
                    field = %criterion.field,
                    "Sort transforms are not pushed down to the store"
                );
            }
            Some(format!(
                "{} {}",
                registry.order_expr(dialect.id(), &criterion.field, column),
                criterion.direction.as_sql()
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One row of the `entities` table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(any(feature = "sqlite", feature = "mysql"), derive(sqlx::FromRow))]
pub struct EntityRow {
    pub id: String,
    pub entity_type: String,
    pub name: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl EntityRow {
    /// Value stored in the `name_folded` column
    pub fn name_folded(&self) -> String {
        fold_case(&self.name)
    }
}

/// Split an entity into its common columns and JSON data.
///
/// Serializes the full entity to JSON, extracts common fields into
/// dedicated columns, and stores remaining fields in the JSON `data` column.
pub fn extract_row<E: SqlMapping>(entity: &E) -> Result<EntityRow, RepositoryError> {
    let mut data = serde_json::to_value(entity).map_err(|e| {
        RepositoryError::storage("sql", format!("Failed to serialize entity: {}", e))
    })?;

    // Remove common fields from data (they're stored in dedicated columns)
    if let Some(obj) = data.as_object_mut() {
        for field in ENTITY_COMMON_FIELDS {
            obj.remove(*field);
        }
    }

    Ok(EntityRow {
        id: entity.id().to_string(),
        entity_type: E::entity_type().to_string(),
        name: entity.name().to_string(),
        data,
        created_at: entity.created_at(),
    })
}

/// Rebuild and re-validate a domain entity from a row.
///
/// Rows that cannot be deserialized, or that deserialize into an entity
/// breaking its own rules, are reported as validation errors: they hold
/// state that no longer satisfies the aggregate's invariants.
pub fn reconstruct_entity<E: SqlMapping>(row: EntityRow) -> Result<E, RepositoryError> {
    let mut json = if row.data.is_object() {
        row.data
    } else {
        serde_json::json!({})
    };

    if let Some(obj) = json.as_object_mut() {
        obj.insert("id".into(), serde_json::json!(row.id));
        obj.insert("name".into(), serde_json::json!(row.name));
        obj.insert("created_at".into(), serde_json::json!(row.created_at));
    }

    let entity = serde_json::from_value::<E>(json).map_err(|e| {
        tracing::warn!(
            entity_type = E::entity_type(),
            id = %row.id,
            error = %e,
            "Stored row does not match the entity shape"
        );
        ValidationError::field("data", e.to_string())
    })?;

    entity.validate().inspect_err(|e| {
        tracing::warn!(
            entity_type = E::entity_type(),
            id = %row.id,
            error = %e,
            "Stored row fails entity validation"
        );
    })?;

    Ok(entity)
}

/// Total rows reported by `COUNT(*)` as a result count
pub fn count_to_total(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

/// Shorthand used by the backends for statement failures
pub fn query_error(dialect: Dialect, context: &str, err: impl fmt::Display) -> RepositoryError {
    RepositoryError::storage(dialect.backend_name(), format!("{}: {}", context, err))
}
