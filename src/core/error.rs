//! Typed error handling for the catalog
//!
//! # Error Categories
//!
//! - [`ValidationError`]: field-level validation failures (entity rules,
//!   search filter rules, persisted rows that no longer validate)
//! - [`RepositoryError`]: errors surfaced by repositories (missing entities,
//!   storage failures, invalid persisted state)
//!
//! Search input sanitization never produces an error: malformed page, limit,
//! sort or filter values are coerced to defaults. The only hard failures the
//! search engine surfaces come from filter validation hooks and from
//! rehydrating persisted rows.
//!
//! # Example
//!
//! ```rust,ignore
//! match repository.find_by_id(&id).await {
//!     Ok(Some(category)) => println!("Found: {:?}", category),
//!     Ok(None) => println!("Nothing stored under {}", id),
//!     Err(RepositoryError::Validation(e)) => eprintln!("Corrupted row: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// A single field → message pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors related to validation of entities and search filters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more fields failed validation
    #[error("Validation failed: {}", format_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),
}

fn format_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Build an error for a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::FieldErrors(vec![FieldValidationError::new(field, message)])
    }

    /// All field errors, in the order they were reported
    pub fn errors(&self) -> &[FieldValidationError] {
        match self {
            ValidationError::FieldErrors(errors) => errors,
        }
    }

    /// Messages grouped by field name
    pub fn fields(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in self.errors() {
            grouped
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }
        grouped
    }
}

/// Errors surfaced by repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity was not found
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: String },

    /// A stored or incoming entity failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backing store failure (query, connection, serialization)
    #[error("{backend} storage error: {message}")]
    Storage { backend: String, message: String },

    /// In-memory lock was poisoned
    #[error("Failed to acquire lock: {0}")]
    Lock(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn storage(backend: impl Into<String>, message: impl ToString) -> Self {
        RepositoryError::Storage {
            backend: backend.into(),
            message: message.to_string(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            RepositoryError::NotFound { .. } => "NOT_FOUND",
            RepositoryError::Validation(_) => "VALIDATION_ERROR",
            RepositoryError::Storage { .. } => "STORAGE_ERROR",
            RepositoryError::Lock(_) => "INTERNAL_ERROR",
        }
    }
}
