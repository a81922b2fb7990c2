use serde_json::Value;

use crate::assertion::types::{AssertError, FieldPath, Segment};
use crate::http::Response;

impl FieldPath {
    /// Value the path points at inside `root`, or `None` if any step is missing.
    ///
    /// A key applied to a list is taken from every element (elements lacking it yield
    /// `null`), so `userId` on a list body produces the list of all `userId`s.
    pub fn select(&self, root: &Value) -> Option<Value> {
        let mut current = root.clone();
        for segment in &self.segments {
            current = apply(segment, current)?;
        }
        Some(current)
    }
}

fn apply(segment: &Segment, value: Value) -> Option<Value> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(mut map)) => map.remove(key),
        (Segment::Key(key), Value::Array(items)) => Some(Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
                    _ => Value::Null,
                })
                .collect(),
        )),
        (Segment::Index(index), Value::Array(items)) => {
            let len = items.len() as i64;
            let position = if *index < 0 { len + index } else { *index };
            if (0..len).contains(&position) {
                items.into_iter().nth(position as usize)
            } else {
                None
            }
        }
        (Segment::Wildcard, Value::Array(items)) => Some(Value::Array(items)),
        (Segment::Wildcard, Value::Object(map)) => {
            Some(Value::Array(map.into_iter().map(|(_, v)| v).collect()))
        }
        _ => None,
    }
}

/// Parsed JSON body of the response.
pub fn body_json(response: &Response) -> Result<&Value, AssertError> {
    response.json.as_ref().ok_or(AssertError::NotJson)
}

/// Read the value at `path` from the response body.
pub fn extract_value(response: &Response, path: &FieldPath) -> Result<Value, AssertError> {
    path.select(body_json(response)?)
        .ok_or_else(|| AssertError::PathNotFound(path.to_string()))
}

/// Text form of a JSON value, the way a field is read "as a string".
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON equality that treats `42` and `42.0` as equal.
pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (a, b) => a == b,
    }
}
