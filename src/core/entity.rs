//! Entity traits and identity value objects

use crate::core::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identity of an aggregate.
///
/// Wraps a UUID so identities can only be built from valid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity, reporting an `id` field error on bad input
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValidationError::field("id", format!("'{}' is not a valid UUID", value)))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base trait for all aggregates in the catalog.
///
/// All entities have:
/// - id: Unique identifier
/// - entity_type: Singular type name (e.g., "category", "cast_member")
/// - name: A human-readable name
/// - created_at: Creation timestamp
///
/// Validation is delegated to a notification collaborator; `validate()`
/// reports every field that currently breaks the entity's rules.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The singular type name, also used as the discriminator in shared tables
    fn entity_type() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> EntityId;

    /// Get the name of this entity
    fn name(&self) -> &str;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Check every field rule of the entity
    fn validate(&self) -> Result<(), ValidationError>;
}
