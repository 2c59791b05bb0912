//! Field-level validation errors.
//!
//! Request payloads are checked field by field and every problem is collected, so a
//! client gets all messages in one 422 response:
//!
//! ```json
//! {"message": "The phone field is required.", "errors": {"phone": ["The phone field is required."]}}
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Ordered field -> messages map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single-field error.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field.to_string(), vec![message])),
        }
    }

    /// Returns the trimmed value, or records "required" and returns `None`.
    pub fn require(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v.to_string()),
            None => {
                self.add(field, format!("The {} field is required.", label(field)));
                None
            }
        }
    }

    /// Records `message` for `field` unless `condition` holds.
    pub fn check(&mut self, condition: bool, field: &str, message: impl Into<String>) {
        if !condition {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_message(&self) -> &str {
        self.fields
            .first()
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
            .unwrap_or("The given data was invalid.")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message())
    }
}

impl std::error::Error for ValidationErrors {}

struct FieldMap<'a>(&'a [(String, Vec<String>)]);

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, messages) in self.0 {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("message", self.first_message())?;
        map.serialize_entry("errors", &FieldMap(&self.fields))?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_messages_per_field_in_order() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.require("full_name", Some("   ")), None);
        assert_eq!(errors.require("phone", Some(" +4915112345678 ")).as_deref(), Some("+4915112345678"));
        errors.check(false, "email", "The email must be a valid email address.");
        errors.check(true, "email", "unused");
        errors.add("full_name", "second");

        assert_eq!(errors.messages("full_name").len(), 2);
        assert_eq!(errors.first_message(), "The full name field is required.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["message"], "The full name field is required.");
        assert_eq!(json["errors"]["email"][0], "The email must be a valid email address.");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn empty_errors_pass() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
