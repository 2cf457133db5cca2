//! Category aggregate

use crate::core::entity::{Entity, EntityId};
use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use crate::core::notification::Notification;
use crate::search::{Searchable, SortCriterion, SortField};
use crate::storage::sql::{Predicate, SqlMapping};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A catalog category (e.g. "Movie", "Documentary")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Category {
    pub id: EntityId,

    #[validate(length(min = 1, max = 255, message = "name must have between 1 and 255 characters"))]
    pub name: String,

    pub description: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new, validated category
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        is_active: bool,
    ) -> Result<Self, ValidationError> {
        let category = Self {
            id: EntityId::new(),
            name: name.into(),
            description,
            is_active,
            created_at: Utc::now(),
        };
        category.validate_rules()?;
        Ok(category)
    }

    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = name.into();
        self.validate_rules()
    }

    pub fn change_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    fn validate_rules(&self) -> Result<(), ValidationError> {
        let mut notification = Notification::new();
        if let Err(errors) = Validate::validate(self) {
            notification.extend(errors.into());
        }
        notification.into_result()
    }
}

impl Entity for Category {
    fn entity_type() -> &'static str {
        "category"
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.validate_rules()
    }
}

fn sort_by_name(category: &Category) -> FieldValue {
    FieldValue::from(category.name.as_str())
}

fn sort_by_created_at(category: &Category) -> FieldValue {
    FieldValue::from(category.created_at)
}

const CATEGORY_SORT_FIELDS: &[SortField<Category>] = &[
    SortField::new("name", sort_by_name),
    SortField::new("created_at", sort_by_created_at),
];

impl Searchable for Category {
    type Filter = String;

    fn sort_fields() -> &'static [SortField<Self>] {
        CATEGORY_SORT_FIELDS
    }

    fn matches(&self, filter: &String) -> bool {
        self.name.to_lowercase().contains(&filter.to_lowercase())
    }

    fn default_sort() -> Vec<SortCriterion> {
        vec![SortCriterion::desc("created_at")]
    }
}

impl SqlMapping for Category {
    fn filter_predicates(filter: &String) -> Vec<Predicate> {
        vec![Predicate::ContainsIgnoreCase {
            column: "name",
            needle: filter.clone(),
        }]
    }
}
