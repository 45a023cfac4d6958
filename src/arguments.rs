//! Values going into and coming out of an invocation.

use crate::node::SourceNode;
use crate::value::Value;
use ahash::AHashMap;
use serde::Serialize;

/// An insertion-ordered map of names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueMap(Vec<(String, Value)>);

/// The resolved values handed to a target, by source or injection name.
pub type Arguments = ValueMap;

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    /// The value under `name`, treating `Missing` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw(name).filter(|v| !v.is_missing())
    }

    /// The value under `name`, including `Missing`.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Moves every entry of `other` into `self`, replacing on conflict.
    pub fn extend(&mut self, other: ValueMap) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Supplies raw values to sources at the start of an invocation.
pub trait ValueProvider {
    /// The raw value for `source` and whether it was provided, or `None` to
    /// let the source fall back to its own lookup.
    fn raw_value(&self, source: &SourceNode) -> Option<(Value, bool)>;
}

/// The raw values of one invocation.
///
/// A value stored under a source's name counts as provided. Names matching no
/// source, and values added with `with_extra`, are passed to the target
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: AHashMap<String, Value>,
    extras: ValueMap,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(name, value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &AHashMap<String, Value> {
        &self.values
    }

    pub fn extras(&self) -> &ValueMap {
        &self.extras
    }

    /// Builds call arguments from a JSON object of name to value.
    pub fn from_json(json: serde_json::Value) -> Result<Self, String> {
        let serde_json::Value::Object(entries) = json else {
            return Err(format!("expected a JSON object, found {}", json));
        };
        Ok(entries
            .into_iter()
            .fold(CallArgs::new(), |args, (name, value)| {
                args.with(name, Value::from_json(value))
            }))
    }
}

impl ValueProvider for CallArgs {
    fn raw_value(&self, source: &SourceNode) -> Option<(Value, bool)> {
        self.values
            .get(source.name())
            .map(|value| (value.clone(), !value.is_missing()))
    }
}
