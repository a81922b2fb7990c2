use std::time::Duration;

use serde_json::Value;

use crate::assertion::extractor::{extract_value, value_as_string, values_equal};
use crate::assertion::parser::parse_field_path;
use crate::assertion::types::{AssertError, FieldPath, Segment};
use crate::http::Response;

/// Exact HTTP status code.
pub fn status_code_is(response: &Response, expected: u16) -> Result<(), AssertError> {
    let actual = response.status_code();
    if actual == expected {
        Ok(())
    } else {
        Err(AssertError::mismatch("HTTP Status Code", expected, actual))
    }
}

/// Field value equals `expected` as JSON, so `42` matches `42.0` but not `"42"`.
pub fn field_equals(
    response: &Response,
    path: &FieldPath,
    expected: &Value,
) -> Result<(), AssertError> {
    let actual = extract_value(response, path)?;
    if values_equal(&actual, expected) {
        Ok(())
    } else {
        Err(AssertError::mismatch(format!("Field: {}", path), expected, actual))
    }
}

/// Field read as text equals `expected`; numbers and booleans compare by their text form.
pub fn field_string_equals(
    response: &Response,
    path: &FieldPath,
    expected: &str,
) -> Result<(), AssertError> {
    let actual = value_as_string(&extract_value(response, path)?);
    if actual == expected {
        Ok(())
    } else {
        Err(AssertError::mismatch(format!("Field: {}", path), expected, actual))
    }
}

/// Field is present and not `null`. Returns the value.
pub fn field_not_null(response: &Response, path: &FieldPath) -> Result<Value, AssertError> {
    match extract_value(response, path) {
        Ok(Value::Null) | Err(AssertError::PathNotFound(_)) => {
            Err(AssertError::NullField(path.to_string()))
        }
        other => other,
    }
}

/// Elements of the list at `path`.
pub fn list_at(response: &Response, path: &FieldPath) -> Result<Vec<Value>, AssertError> {
    match extract_value(response, path)? {
        Value::Array(items) => Ok(items),
        other => Err(AssertError::NotAList {
            subject: subject_of(path),
            actual: kind_of(&other).to_string(),
        }),
    }
}

/// The value at `path` is a list with at least one element. Returns its length.
pub fn non_empty_list(response: &Response, path: &FieldPath) -> Result<usize, AssertError> {
    let items = list_at(response, path)?;
    if items.is_empty() {
        return Err(AssertError::EmptyList(subject_of(path)));
    }
    Ok(items.len())
}

pub fn list_len_at_least(
    response: &Response,
    path: &FieldPath,
    min: usize,
) -> Result<usize, AssertError> {
    let len = list_at(response, path)?.len();
    if len >= min {
        Ok(len)
    } else {
        Err(AssertError::mismatch(
            format!("{} length", subject_of(path)),
            format!(">= {}", min),
            len,
        ))
    }
}

/// Every element of the list at `path` carries each of `fields` with a non-null value.
pub fn each_item_has_fields(
    response: &Response,
    path: &FieldPath,
    fields: &[&str],
) -> Result<(), AssertError> {
    for (index, item) in list_at(response, path)?.iter().enumerate() {
        for field in fields {
            let present = item.get(field).is_some_and(|v| !v.is_null());
            if !present {
                return Err(AssertError::MissingField {
                    index,
                    field: field.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Every value selected by `path` equals `expected`.
///
/// `path` is expected to select a list, typically a key spread over a list body such as
/// `userId`.
pub fn each_value_equals(
    response: &Response,
    path: &FieldPath,
    expected: &Value,
) -> Result<(), AssertError> {
    for (index, actual) in list_at(response, path)?.iter().enumerate() {
        if !values_equal(actual, expected) {
            return Err(AssertError::mismatch(
                format!("Field '{}' at item {}", path, index),
                expected,
                actual,
            ));
        }
    }
    Ok(())
}

/// `field` of the first element of the list body, read as text, equals `expected`.
///
/// `field` is a path relative to that element, so `address.city` reads a nested value.
pub fn first_item_field_equals(
    response: &Response,
    field: &str,
    expected: &str,
) -> Result<(), AssertError> {
    let relative = parse_field_path(field)?;
    let segments = std::iter::once(Segment::Index(0))
        .chain(relative.segments().iter().cloned())
        .collect();
    let path = FieldPath::new(segments);
    let actual = value_as_string(&extract_value(response, &path)?);
    if actual == expected {
        Ok(())
    } else {
        Err(AssertError::mismatch(
            format!("First item's {}", field),
            expected,
            actual,
        ))
    }
}

/// Elapsed time strictly below `max`.
pub fn response_time_below(response: &Response, max: Duration) -> Result<(), AssertError> {
    let actual_ms = response.time_ms();
    let max_ms = max.as_millis();
    if actual_ms < max_ms {
        Ok(())
    } else {
        Err(AssertError::TooSlow { actual_ms, max_ms })
    }
}

/// Read a field for later reuse.
pub fn extract(response: &Response, path: &FieldPath) -> Result<Value, AssertError> {
    extract_value(response, path)
}

fn subject_of(path: &FieldPath) -> String {
    if path.is_root() {
        "Response".to_string()
    } else {
        format!("Field '{}'", path)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
