//! Validation notification collecting field errors
//!
//! Entities declare their field rules with `validator`'s derive and report
//! them through a [`Notification`], which preserves the order fields failed
//! in and converts into a [`ValidationError`] when anything was flagged.

use crate::core::error::{FieldValidationError, ValidationError};
use indexmap::IndexMap;

/// Accumulates `field -> [messages]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    errors: IndexMap<String, Vec<String>>,
}

impl Notification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field; duplicate messages are kept once
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let messages = self.errors.entry(field.into()).or_default();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Merge another notification into this one
    pub fn extend(&mut self, other: Notification) {
        for (field, messages) in other.errors {
            for message in messages {
                self.add_error(field.clone(), message);
            }
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if !self.has_errors() {
            return Ok(());
        }

        let errors = self
            .errors
            .into_iter()
            .flat_map(|(field, messages)| {
                messages
                    .into_iter()
                    .map(move |message| FieldValidationError::new(field.clone(), message))
            })
            .collect();

        Err(ValidationError::FieldErrors(errors))
    }
}

impl From<validator::ValidationErrors> for Notification {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut notification = Notification::new();
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        for (field, field_errors) in fields {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                notification.add_error(field.to_string(), message);
            }
        }

        notification
    }
}
