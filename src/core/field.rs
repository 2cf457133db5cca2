//! Field values used for sorting and filtering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
///
/// Sort accessors read entity fields into a `FieldValue` so the search
/// pipeline can compare any two entities without dynamic property lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Total order over field values.
    ///
    /// Values of the same variant compare naturally (strings byte-wise,
    /// floats with `total_cmp`). `Null` sorts before everything else and
    /// mixed variants are ordered by variant rank.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Float(a), FieldValue::Integer(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => a.cmp(b),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Float(_) => 2,
            FieldValue::String(_) => 3,
            FieldValue::Uuid(_) => 4,
            FieldValue::DateTime(_) => 5,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_string(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_integer() {
        let value = FieldValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.as_string(), None);
    }

    #[test]
    fn test_field_value_uuid() {
        let id = Uuid::new_v4();
        let value = FieldValue::Uuid(id);
        assert_eq!(value.as_uuid(), Some(id));
        assert_eq!(value.as_string(), None);
    }

    #[test]
    fn test_compare_strings_is_case_sensitive() {
        let upper = FieldValue::from("Zed");
        let lower = FieldValue::from("abc");
        // 'Z' (0x5A) sorts before 'a' (0x61)
        assert_eq!(upper.compare(&lower), Ordering::Less);
        assert_eq!(lower.compare(&upper), Ordering::Greater);
        assert_eq!(lower.compare(&lower.clone()), Ordering::Equal);
    }

    #[test]
    fn test_compare_datetimes() {
        let now = Utc::now();
        let earlier = FieldValue::from(now - Duration::seconds(5));
        let later = FieldValue::from(now);
        assert_eq!(earlier.compare(&later), Ordering::Less);
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(
            FieldValue::Integer(2).compare(&FieldValue::Float(2.5)),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Float(3.0).compare(&FieldValue::Integer(3)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(
            FieldValue::Null.compare(&FieldValue::from("a")),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Integer(0).compare(&FieldValue::Null),
            Ordering::Greater
        );
        assert_eq!(FieldValue::Null.compare(&FieldValue::Null), Ordering::Equal);
    }

    #[test]
    fn test_from_option() {
        assert!(FieldValue::from(None::<String>).is_null());
        assert_eq!(
            FieldValue::from(Some("x".to_string())),
            FieldValue::String("x".to_string())
        );
    }
}
