//! Sort criteria and their normalization
//!
//! A [`SortCriterion`] is a single `field + direction (+ transform)`
//! instruction. Criteria coming from loosely typed input (query strings,
//! JSON bodies) go through [`normalize_sort_criterion`], which never fails:
//! anything malformed normalizes to `None` and is dropped by the caller.

use crate::core::field::FieldValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Sort direction, `Asc` unless explicitly requested otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse; anything but `asc`/`desc` is `Asc`
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Parse from a raw value; non-strings are `Asc`
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::parse(s),
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison result
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure unary function applied to field values before comparing them
#[derive(Clone)]
pub struct SortTransform(Arc<dyn Fn(&FieldValue) -> FieldValue + Send + Sync>);

impl SortTransform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FieldValue) -> FieldValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Lower-cases string values, leaving other variants untouched
    pub fn lowercase() -> Self {
        Self::new(|value| match value {
            FieldValue::String(s) => FieldValue::String(s.to_lowercase()),
            other => other.clone(),
        })
    }

    pub fn apply(&self, value: &FieldValue) -> FieldValue {
        (self.0)(value)
    }
}

impl fmt::Debug for SortTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SortTransform(..)")
    }
}

/// A single ordering instruction
#[derive(Debug, Clone, Serialize)]
pub struct SortCriterion {
    pub field: String,
    pub direction: SortDirection,
    #[serde(skip)]
    pub transform: Option<SortTransform>,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
            transform: None,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    pub fn with_transform(mut self, transform: SortTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// A criterion is usable only when it names a field
    pub fn is_valid(&self) -> bool {
        !self.field.is_empty()
    }

    /// Re-check a typed criterion, dropping it if it names no field
    pub fn normalize(self) -> Option<Self> {
        self.is_valid().then_some(self)
    }

    /// Comparable value for a field, after the optional transform
    pub fn prepare(&self, value: FieldValue) -> FieldValue {
        match &self.transform {
            Some(transform) => transform.apply(&value),
            None => value,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "field": self.field,
            "direction": self.direction.as_str(),
        })
    }
}

impl PartialEq for SortCriterion {
    fn eq(&self, other: &Self) -> bool {
        let same_transform = match (&self.transform, &other.transform) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        };
        self.field == other.field && self.direction == other.direction && same_transform
    }
}

/// Normalize one raw criterion.
///
/// - non-objects → `None`
/// - `field` missing, not a string, or empty → `None`
/// - `direction` is lower-cased when it is `asc`/`desc` in any case,
///   otherwise `asc`
///
/// Raw input cannot carry a transform; only typed criteria do.
pub fn normalize_sort_criterion(raw: &Value) -> Option<SortCriterion> {
    let object = raw.as_object()?;
    let field = object.get("field")?.as_str()?;

    SortCriterion::new(field, SortDirection::from_value(object.get("direction"))).normalize()
}

/// Normalize zero, one or many raw criteria, keeping priority order.
///
/// Falsy input (`null`, `false`, `0`, `""`) yields no criteria; a scalar is
/// treated as a one-element list; invalid entries are dropped.
pub fn normalize_sort_criteria(raw: &Value) -> Vec<SortCriterion> {
    match raw {
        Value::Array(items) => items.iter().filter_map(normalize_sort_criterion).collect(),
        value if is_falsy(value) => Vec::new(),
        value => normalize_sort_criterion(value).into_iter().collect(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
