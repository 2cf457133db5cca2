//! Cast member aggregate

use crate::core::entity::{Entity, EntityId};
use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use crate::core::notification::Notification;
use crate::search::coerce::{coerce_filter_text, coerce_positive_int};
use crate::search::{SearchFilter, Searchable, SortCriterion, SortField};
use crate::storage::sql::{Predicate, SqlMapping, SqlValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use validator::Validate;

/// Role of a cast member, stored as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum CastMemberType {
    Director = 1,
    Actor = 2,
}

impl CastMemberType {
    pub fn code(&self) -> i64 {
        *self as i64
    }
}

impl TryFrom<i64> for CastMemberType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CastMemberType::Director),
            2 => Ok(CastMemberType::Actor),
            other => Err(format!("invalid cast member type: {}", other)),
        }
    }
}

impl From<CastMemberType> for i64 {
    fn from(value: CastMemberType) -> Self {
        value.code()
    }
}

impl fmt::Display for CastMemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastMemberType::Director => f.write_str("director"),
            CastMemberType::Actor => f.write_str("actor"),
        }
    }
}

/// A person credited on catalog videos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CastMember {
    pub id: EntityId,

    #[validate(length(min = 1, max = 255, message = "name must have between 1 and 255 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub member_type: CastMemberType,

    pub created_at: DateTime<Utc>,
}

impl CastMember {
    pub fn new(
        name: impl Into<String>,
        member_type: CastMemberType,
    ) -> Result<Self, ValidationError> {
        let member = Self {
            id: EntityId::new(),
            name: name.into(),
            member_type,
            created_at: Utc::now(),
        };
        member.validate_rules()?;
        Ok(member)
    }

    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = name.into();
        self.validate_rules()
    }

    pub fn change_type(&mut self, member_type: CastMemberType) {
        self.member_type = member_type;
    }

    fn validate_rules(&self) -> Result<(), ValidationError> {
        let mut notification = Notification::new();
        if let Err(errors) = Validate::validate(self) {
            notification.extend(errors.into());
        }
        notification.into_result()
    }
}

impl Entity for CastMember {
    fn entity_type() -> &'static str {
        "cast_member"
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

/// Filter on name substring and/or exact type.
///
/// Accepts `{"name": .., "type": ..}` objects; any other non-empty value
/// is used as a name filter. A `type` that is not a known code is kept
/// aside and rejected by [`SearchFilter::validate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CastMemberFilter {
    pub name: Option<String>,
    pub member_type: Option<CastMemberType>,
    invalid_type: Option<String>,
}

impl CastMemberFilter {
    pub fn new(name: Option<String>, member_type: Option<CastMemberType>) -> Self {
        Self {
            name,
            member_type,
            invalid_type: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.member_type.is_none() && self.invalid_type.is_none()
    }

    fn parse_type(raw: &Value) -> (Option<CastMemberType>, Option<String>) {
        match raw {
            Value::Null => (None, None),
            Value::String(s) if s.is_empty() => (None, None),
            other => {
                let parsed = coerce_positive_int(other)
                    .and_then(|code| i64::try_from(code).ok())
                    .and_then(|code| CastMemberType::try_from(code).ok());
                match parsed {
                    Some(member_type) => (Some(member_type), None),
                    None => (None, coerce_filter_text(other)),
                }
            }
        }
    }
}

impl SearchFilter for CastMemberFilter {
    fn from_raw(raw: &Value) -> Option<Self> {
        let filter = match raw {
            Value::Object(obj) => {
                let (member_type, invalid_type) =
                    Self::parse_type(obj.get("type").unwrap_or(&Value::Null));
                Self {
                    name: obj.get("name").and_then(coerce_filter_text),
                    member_type,
                    invalid_type,
                }
            }
            other => Self::new(coerce_filter_text(other), None),
        };

        (!filter.is_empty()).then_some(filter)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match &self.invalid_type {
            Some(value) => Err(ValidationError::field(
                "type",
                format!("invalid cast member type: {}", value),
            )),
            None => Ok(()),
        }
    }
}

fn sort_by_name(member: &CastMember) -> FieldValue {
    FieldValue::from(member.name.as_str())
}

fn sort_by_created_at(member: &CastMember) -> FieldValue {
    FieldValue::from(member.created_at)
}

const CAST_MEMBER_SORT_FIELDS: &[SortField<CastMember>] = &[
    SortField::new("name", sort_by_name),
    SortField::new("created_at", sort_by_created_at),
];

impl Searchable for CastMember {
    type Filter = CastMemberFilter;

    fn sort_fields() -> &'static [SortField<Self>] {
        CAST_MEMBER_SORT_FIELDS
    }

    fn matches(&self, filter: &CastMemberFilter) -> bool {
        let name_matches = filter
            .name
            .as_ref()
            .is_none_or(|name| self.name.to_lowercase().contains(&name.to_lowercase()));
        let type_matches = filter
            .member_type
            .is_none_or(|member_type| self.member_type == member_type);

        name_matches && type_matches
    }

    fn default_sort() -> Vec<SortCriterion> {
        vec![SortCriterion::desc("created_at")]
    }
}

impl SqlMapping for CastMember {
    fn filter_predicates(filter: &CastMemberFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(name) = &filter.name {
            predicates.push(Predicate::ContainsIgnoreCase {
                column: "name",
                needle: name.clone(),
            });
        }
        if let Some(member_type) = filter.member_type {
            predicates.push(Predicate::JsonEquals {
                path: "$.type",
                value: SqlValue::Integer(member_type.code()),
            });
        }
        predicates
    }
}
