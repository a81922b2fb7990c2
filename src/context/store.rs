use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde_json::{Number, Value};

use crate::http::Response;

/// Key/value state shared by the steps of one scenario.
///
/// Values are stored with their concrete type and read back typed at the call site:
/// asking for a different type than the one stored yields `None`.
#[derive(Default)]
pub struct ScenarioContext {
    entries: HashMap<String, Box<dyn Any>>,
}

impl ScenarioContext {
    /// Key under which the last captured response is kept
    pub const RESPONSE_KEY: &'static str = "response";

    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under the same key.
    pub fn set<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.get_ref::<T>(key).cloned()
    }

    pub fn get_ref<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop a single entry. Returns whether it existed.
    pub fn remove_entry(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn set_response(&mut self, response: Response) {
        self.set(Self::RESPONSE_KEY, response);
    }

    pub fn response(&self) -> Option<&Response> {
        self.get_ref::<Response>(Self::RESPONSE_KEY)
    }

    /// A stored scalar as JSON, whichever scalar type it was stored with.
    ///
    /// `None` when the key is absent or holds a non-scalar value.
    pub fn json_value(&self, key: &str) -> Option<Value> {
        let value = self.entries.get(key)?;

        if let Some(json) = value.downcast_ref::<Value>() {
            return Some(json.clone());
        }
        if let Some(s) = value.downcast_ref::<String>() {
            return Some(Value::from(s.as_str()));
        }
        if let Some(s) = value.downcast_ref::<&'static str>() {
            return Some(Value::from(*s));
        }
        if let Some(n) = value.downcast_ref::<i64>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = value.downcast_ref::<i32>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = value.downcast_ref::<u64>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = value.downcast_ref::<usize>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = value.downcast_ref::<f64>() {
            return Number::from_f64(*n).map(Value::Number);
        }
        if let Some(b) = value.downcast_ref::<bool>() {
            return Some(Value::Bool(*b));
        }
        None
    }

    /// Text form of a stored scalar, used for placeholder substitution.
    pub fn display_value(&self, key: &str) -> Option<String> {
        Some(match self.json_value(key)? {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("ScenarioContext")
            .field("keys", &keys)
            .finish()
    }
}
