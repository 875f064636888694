//! Row validation against a field schema
//!
//! Every problem in a row is collected before the verdict: a row missing both
//! `first_name` and `phone` with a malformed `age` reports three reasons. Any
//! reason makes the row invalid, including a bad optional field (the bad field
//! is also left out of the record).

use crate::models::{FieldRule, FieldSchema, FieldValue, RawRow, RowOutcome, ValidatedRecord};

/// Validate one row
///
/// `index` is the row's 0-based position in its batch and is carried into
/// [`RowOutcome::Invalid`] so callers can report it.
pub fn validate_row(row: &RawRow, schema: &FieldSchema, index: usize) -> RowOutcome {
    let mut record = ValidatedRecord::new();
    let mut reasons = Vec::new();

    for &field in schema.required {
        match row.get(field).map(|v| v.trim()) {
            None => reasons.push(format!("{} is required", field)),
            Some("") => reasons.push(format!("{} cannot be empty", field)),
            Some(value) => {
                record.insert(field.to_string(), FieldValue::from(value));
            }
        }
    }

    for optional in schema.optional {
        let Some(value) = row.get(optional.name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };

        match coerce(value, optional.rule) {
            Ok(coerced) => {
                record.insert(optional.name.to_string(), coerced);
            }
            Err(problem) => reasons.push(format!("{} {}", optional.name, problem)),
        }
    }

    if reasons.is_empty() {
        RowOutcome::Valid(record)
    } else {
        RowOutcome::Invalid { index, reasons }
    }
}

/// Validate every row, one outcome per row in input order
pub fn validate_rows(rows: &[RawRow], schema: &FieldSchema) -> Vec<RowOutcome> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| validate_row(row, schema, index))
        .collect()
}

fn coerce(value: &str, rule: FieldRule) -> Result<FieldValue, &'static str> {
    match rule {
        FieldRule::Text => Ok(FieldValue::from(value)),
        FieldRule::PositiveInteger => {
            let number = parse_integer(value).ok_or("must be a valid number")?;
            if number <= 0 {
                return Err("must be greater than 0");
            }
            Ok(FieldValue::Integer(number))
        }
        FieldRule::Email => {
            if value.contains('@') {
                Ok(FieldValue::from(value))
            } else {
                Err("has invalid email format")
            }
        }
    }
}

/// Parse an integer, accepting integral decimals ("30.0") as spreadsheets export them
fn parse_integer(value: &str) -> Option<i64> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }

    let f: f64 = value.parse().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
