//! Field-level validation that accumulates errors instead of failing fast
//!
//! Every check that fails records a message keyed by the field name. Only the
//! first message per field is kept, so callers see one actionable complaint per
//! field while still getting every failing field in a single pass.
//!
//! # Example
//!
//! ```rust
//! use arena_data::validator::Validator;
//!
//! let name = "";
//! let health = -1;
//!
//! let mut v = Validator::new();
//! v.check(!name.is_empty(), "name", "must be provided");
//! v.check(health > 0, "health", "must be greater than zero");
//!
//! let errors = v.finish().unwrap_err();
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors.get("name"), Some("must be provided"));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

/// Accumulated field errors, keyed by field name
///
/// Serializes as a flat JSON object (`{"sort": "invalid sort value"}`) so the
/// HTTP layer can embed it directly in a 422 response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message recorded for `field`, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterate over `(field, message)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge another set of errors into this one, keeping existing messages
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.0 {
            self.0.entry(field).or_insert(message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects field errors across a series of checks
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no check has failed so far
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .0
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// Record `message` for `field` when `ok` is false
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Errors collected so far
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Consume the validator, returning the collected errors if any check failed
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// True when `value` is one of `permitted`
pub fn permitted_value(value: &str, permitted: &[&str]) -> bool {
    permitted.iter().any(|candidate| *candidate == value)
}

/// True when every element of `values` is distinct
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_starts_valid() {
        let v = Validator::new();
        assert!(v.is_valid());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_validator_accumulates_all_fields() {
        let mut v = Validator::new();
        v.check(false, "page", "must be greater than zero");
        v.check(true, "page_size", "must be greater than zero");
        v.check(false, "sort", "invalid sort value");

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains("page"));
        assert!(errors.contains("sort"));
        assert!(!errors.contains("page_size"));
    }

    #[test]
    fn test_validator_keeps_first_message_per_field() {
        let mut v = Validator::new();
        v.add_error("name", "must be provided");
        v.add_error("name", "must not be more than 500 bytes long");

        assert_eq!(v.errors().get("name"), Some("must be provided"));
    }

    #[test]
    fn test_merge_keeps_existing_messages() {
        let mut a = Validator::new();
        a.add_error("page", "must be an integer value");
        let mut b = Validator::new();
        b.add_error("page", "must be greater than zero");
        b.add_error("sort", "invalid sort value");

        let mut errors = a.finish().unwrap_err();
        errors.merge(b.finish().unwrap_err());
        assert_eq!(errors.get("page"), Some("must be an integer value"));
        assert_eq!(errors.get("sort"), Some("invalid sort value"));
    }

    #[test]
    fn test_permitted_value() {
        let safelist = ["id", "-id", "name"];
        assert!(permitted_value("id", &safelist));
        assert!(permitted_value("-id", &safelist));
        assert!(!permitted_value("name; DROP TABLE characters", &safelist));
        assert!(!permitted_value("", &safelist));
    }

    #[test]
    fn test_unique() {
        assert!(unique(&["tank", "support"]));
        assert!(!unique(&["tank", "support", "tank"]));
        assert!(unique::<&str>(&[]));
    }

    #[test]
    fn test_display_lists_fields_in_order() {
        let mut v = Validator::new();
        v.add_error("sort", "invalid sort value");
        v.add_error("page", "must be greater than zero");
        let errors = v.finish().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "page: must be greater than zero; sort: invalid sort value"
        );
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut v = Validator::new();
        v.add_error("sort", "invalid sort value");
        let errors = v.finish().unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"sort": "invalid sort value"}));
    }
}
