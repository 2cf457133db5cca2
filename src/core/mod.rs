//! Core module containing fundamental traits and types for the catalog

pub mod entity;
pub mod error;
pub mod field;
pub mod notification;
pub mod repository;

pub use entity::{Entity, EntityId};
pub use error::{FieldValidationError, RepositoryError, ValidationError};
pub use field::FieldValue;
pub use notification::Notification;
pub use repository::{Repository, RepositoryResult, SearchableRepository};
