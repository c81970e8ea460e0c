//! Configuration parameter values.
//!
//! Components declare their defaults as a `Parameters` map; callers
//! override per-node values at instantiation time. Values are JSON
//! values so that parameter sets and pipeline specs deserialize from
//! the same documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type ParamResult<T> = Result<T, ParamError>;

/// Errors from typed parameter lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing required parameter {name}")]
    Missing { name: String },

    #[error("parameter {name} has the wrong type (expected {expected})")]
    WrongType { name: String, expected: &'static str },
}

/// Ordered mapping of option name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, Value>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Overlay `overrides` on top of `self`. Keys present in both take
    /// the override's value; keys only in `self` keep their defaults.
    pub fn merged(&self, overrides: &Parameters) -> Parameters {
        let mut merged = self.0.clone();
        for (name, value) in &overrides.0 {
            merged.insert(name.clone(), value.clone());
        }
        Parameters(merged)
    }

    pub fn get_f64(&self, name: &str) -> ParamResult<f64> {
        self.require(name)?.as_f64().ok_or(ParamError::WrongType {
            name: name.to_string(),
            expected: "number",
        })
    }

    pub fn get_usize(&self, name: &str) -> ParamResult<usize> {
        self.require(name)?
            .as_u64()
            .map(|value| value as usize)
            .ok_or(ParamError::WrongType {
                name: name.to_string(),
                expected: "non-negative integer",
            })
    }

    pub fn get_bool(&self, name: &str) -> ParamResult<bool> {
        self.require(name)?.as_bool().ok_or(ParamError::WrongType {
            name: name.to_string(),
            expected: "boolean",
        })
    }

    pub fn get_str(&self, name: &str) -> ParamResult<&str> {
        self.require(name)?.as_str().ok_or(ParamError::WrongType {
            name: name.to_string(),
            expected: "string",
        })
    }

    fn require(&self, name: &str) -> ParamResult<&Value> {
        self.0.get(name).ok_or_else(|| ParamError::Missing {
            name: name.to_string(),
        })
    }
}

impl FromIterator<(String, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Parameters(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Parameters {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Parameters(map)
    }
}
