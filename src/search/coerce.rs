//! Permissive coercion of loosely typed search input
//!
//! These functions never fail. Input that cannot be coerced yields `None`
//! and the caller substitutes its default.

use serde_json::Value;

/// Coerce a page or limit value to a positive integer.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace is
/// ignored) whose value is a finite, strictly positive integer. `2.0` and
/// `"2.0"` coerce to `2`; `1.5`, `0`, negatives, booleans, objects, arrays
/// and `null` do not coerce.
pub fn coerce_positive_int(value: &Value) -> Option<usize> {
    let number = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return usize::try_from(u).ok().filter(|u| *u > 0);
            }
            n.as_f64()?
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };

    if !number.is_finite() || number.fract() != 0.0 || number < 1.0 {
        return None;
    }
    if number > usize::MAX as f64 {
        return None;
    }

    Some(number as usize)
}

/// Coerce a filter value to text.
///
/// `null` and `""` mean "no filter". Strings pass through unchanged,
/// numbers and booleans use their display form, and objects or arrays are
/// rendered as compact JSON.
pub fn coerce_filter_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
