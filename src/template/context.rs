//! Variable context handed to a compiled template for one render.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Mapping from variable name to a weakly typed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableContext {
    variables: Map<String, JsonValue>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable, replacing any previous value under the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert any `Serialize` value, e.g. a list of member descriptors.
    pub fn insert_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.variables.insert(key.into(), value);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.variables.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.variables.iter()
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.variables
    }
}

impl From<Map<String, JsonValue>> for VariableContext {
    fn from(variables: Map<String, JsonValue>) -> Self {
        Self { variables }
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for VariableContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}
