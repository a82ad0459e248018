//! Field-level validation errors and helpers for request payloads.
//!
//! Payload DTOs keep every field as `Option<Option<serde_json::Value>>` so
//! that a missing key (`None`) can be told apart from an explicit JSON
//! `null` (`Some(None)`), and so that a value of the wrong JSON type is
//! reported against its own field instead of failing the whole body. The
//! helpers here coerce that tri-state into plain values while collecting
//! messages per offending field.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_NULL_CHARACTER: &str = "Null characters are not allowed.";
pub const MSG_INVALID_INTEGER: &str = "A valid integer is required.";
pub const MSG_INVALID_NUMBER: &str = "A valid number is required.";
pub const MSG_INVALID_STRING: &str = "Not a valid string.";

/// Validation messages keyed by field path (`name`, `group.scientific_name`,
/// `traits[0].name`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Merge all of `other` into `self`.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Merge `other` under `prefix`, e.g. `scientific_name` becomes
    /// `group.scientific_name`.
    pub fn extend_nested(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            let path = format!("{prefix}.{field}");
            self.0.entry(path).or_default().extend(messages);
        }
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| err.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Serde `deserialize_with` target that maps a present key to `Some(..)`.
///
/// Combined with `#[serde(default)]`, a missing key stays `None` while an
/// explicit `null` becomes `Some(None)`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolve a tri-state payload field.
///
/// A missing field is an error only when `required`; an explicit `null`
/// is always an error.
pub fn take<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<T>>,
    required: bool,
) -> Option<T> {
    match value {
        None => {
            if required {
                errors.add(field, MSG_REQUIRED);
            }
            None
        }
        Some(None) => {
            errors.add(field, MSG_NULL);
            None
        }
        Some(Some(v)) => Some(v),
    }
}

/// Text field: strings and numbers are accepted, surrounding whitespace is
/// trimmed, and blank values or values containing NUL are rejected.
pub fn take_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<Value>>,
    required: bool,
) -> Option<String> {
    let text = match take(errors, field, value, required)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => {
            errors.add(field, MSG_INVALID_STRING);
            return None;
        }
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        errors.add(field, MSG_BLANK);
        return None;
    }
    if trimmed.contains('\0') {
        errors.add(field, MSG_NULL_CHARACTER);
        return None;
    }
    Some(trimmed.to_string())
}

/// Integer field: JSON integers, floats without a fractional part and
/// numeric strings (`"3"`, `" 3.0 "`) are accepted.
pub fn take_integer(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<Value>>,
    required: bool,
) -> Option<i32> {
    let parsed = match take(errors, field, value, required)? {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i128::from(i)),
            (None, Some(f)) if f.is_finite() && f.fract() == 0.0 => Some(f as i128),
            _ => None,
        },
        Value::String(s) => parse_integer_text(&s),
        _ => None,
    };

    let Some(wide) = parsed else {
        errors.add(field, MSG_INVALID_INTEGER);
        return None;
    };
    match i32::try_from(wide) {
        Ok(v) => Some(v),
        Err(_) if wide > 0 => {
            errors.add(
                field,
                format!("Ensure this value is less than or equal to {}.", i32::MAX),
            );
            None
        }
        Err(_) => {
            errors.add(
                field,
                format!("Ensure this value is greater than or equal to {}.", i32::MIN),
            );
            None
        }
    }
}

/// Floating-point field: JSON numbers and numeric strings are accepted;
/// non-finite values are not.
pub fn take_number(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<Value>>,
    required: bool,
) -> Option<f64> {
    let parsed = match take(errors, field, value, required)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(f) if f.is_finite() => Some(f),
        _ => {
            errors.add(field, MSG_INVALID_NUMBER);
            None
        }
    }
}

/// Choice field: the raw value as text, for comparison against the choices.
pub fn choice_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Nested object field. Anything other than a JSON object is rejected
/// against `field`.
pub fn take_object<T: DeserializeOwned>(
    errors: &mut FieldErrors,
    field: &str,
    value: Value,
) -> Option<T> {
    if !value.is_object() {
        errors.add(
            field,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(&value)
            ),
        );
        return None;
    }
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

/// List field. Anything other than a JSON array is rejected against `field`.
pub fn take_list(errors: &mut FieldErrors, field: &str, value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        other => {
            errors.add(
                field,
                format!(
                    "Expected a list of items but got type \"{}\".",
                    type_name(&other)
                ),
            );
            None
        }
    }
}

/// Name of a JSON value's type as it appears in client-facing messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Parse `"3"`, `" +3 "` or `"3.00"` as an integer; `"3.5"` is rejected.
fn parse_integer_text(text: &str) -> Option<i128> {
    let text = text.trim();
    let digits = match text.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return None,
        None => text,
    };
    digits.parse::<i128>().ok()
}
