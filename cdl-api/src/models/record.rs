//! Imported record types and field schemas
//!
//! A [`RawRow`] is what the tabular decoder yields: column name → text. The
//! row validator checks it against a [`FieldSchema`] and produces a
//! [`ValidatedRecord`] of typed values ready for the record store.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One decoded spreadsheet row (column name → cell text)
pub type RawRow = HashMap<String, String>;

/// Typed field value of a validated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// Record that passed schema checks (field name → typed value)
pub type ValidatedRecord = BTreeMap<String, FieldValue>;

/// Coercion/validation rule for an optional field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Copied as trimmed text
    Text,
    /// Integer strictly greater than zero
    PositiveInteger,
    /// Must contain `@`
    Email,
}

/// Optional field and its rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalField {
    pub name: &'static str,
    pub rule: FieldRule,
}

impl OptionalField {
    pub const fn text(name: &'static str) -> Self {
        Self { name, rule: FieldRule::Text }
    }

    pub const fn positive_integer(name: &'static str) -> Self {
        Self { name, rule: FieldRule::PositiveInteger }
    }

    pub const fn email(name: &'static str) -> Self {
        Self { name, rule: FieldRule::Email }
    }
}

/// Field schema for one record kind
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// Record kind label used in messages ("user", "lead", "form")
    pub kind: &'static str,
    /// Required fields, in reporting order
    pub required: &'static [&'static str],
    /// Optional fields with their rules
    pub optional: &'static [OptionalField],
}

impl FieldSchema {
    /// True if the column is part of this schema
    pub fn recognizes(&self, column: &str) -> bool {
        self.required.contains(&column) || self.optional.iter().any(|f| f.name == column)
    }
}

/// Contacts imported from the users spreadsheet
pub const USER_SCHEMA: FieldSchema = FieldSchema {
    kind: "user",
    required: &["first_name", "phone"],
    optional: &[
        OptionalField::text("last_name"),
        OptionalField::positive_integer("age"),
        OptionalField::email("email"),
        OptionalField::text("street_address"),
        OptionalField::text("city"),
        OptionalField::text("state"),
        OptionalField::text("postal_code"),
        OptionalField::text("country"),
    ],
};

/// Leads captured for a campaign form
pub const LEAD_SCHEMA: FieldSchema = FieldSchema {
    kind: "lead",
    required: &["first_name", "phone"],
    optional: &[OptionalField::text("last_name"), OptionalField::email("email")],
};

/// Campaign forms
pub const FORM_SCHEMA: FieldSchema = FieldSchema {
    kind: "form",
    required: &["title"],
    optional: &[OptionalField::text("description")],
};

/// Result of validating one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Valid(ValidatedRecord),
    Invalid { index: usize, reasons: Vec<String> },
}

impl RowOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, RowOutcome::Valid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_serializes_untagged() {
        let mut record = ValidatedRecord::new();
        record.insert("first_name".to_string(), "Ana".into());
        record.insert("age".to_string(), 31i64.into());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"age": 31, "first_name": "Ana"}));
    }

    #[test]
    fn test_schema_recognizes_columns() {
        assert!(USER_SCHEMA.recognizes("phone"));
        assert!(USER_SCHEMA.recognizes("postal_code"));
        assert!(!USER_SCHEMA.recognizes("favorite_color"));
        assert!(!LEAD_SCHEMA.recognizes("age"));
    }
}
