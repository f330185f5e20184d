//! Named, typed invocation arguments.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Text(String),
    Number(f64),
    Object(Value),
}

impl Argument {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
            Self::Object(Value::String(value)) => f.write_str(value),
            Self::Object(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for Argument {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Object(value)
    }
}

/// Argument names are unique; setting an existing name replaces its value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    values: HashMap<String, Argument>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Argument>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Argument>) -> Option<Argument> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.values.get(name)
    }

    /// Text rendering of the named argument, if present.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }

    pub fn remove(&mut self, name: &str) -> Option<Argument> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<Argument>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut arguments = Self::new();
        for (name, value) in iter {
            arguments.set(name, value);
        }
        arguments
    }
}
