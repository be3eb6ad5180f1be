//! Named values supplied to a template.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{error::DomainError, template::KEYWORDS, value_objects::Network};

/// Name under which the target network is bound.
pub const NETWORK_KEY: &str = "network";

/// Immutable mapping from variable name to value.
///
/// A `BTreeMap` keeps iteration (and therefore logs and JSON reports) in a
/// stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    /// Empty bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The one-entry mapping `{ network: <name> }`.
    pub fn for_network(network: &Network) -> Self {
        Self::new().with(NETWORK_KEY, network.as_str())
    }

    /// Add (or replace) a binding, consuming self and returning the result.
    ///
    /// ```rust,ignore
    /// let bindings = Bindings::new()
    ///     .with("network", "mainnet")
    ///     .with("token", "0x7Fc6...");
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Add a binding from a `KEY=VALUE` assignment.
    ///
    /// The value may be empty and may itself contain `=`. The key must be an
    /// identifier usable inside `{{ }}`.
    pub fn define(self, assignment: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidBinding {
            input: assignment.to_owned(),
            reason: reason.to_owned(),
        };

        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| invalid("expected KEY=VALUE"))?;
        let key = key.trim();

        if key.is_empty() {
            return Err(invalid("key is empty"));
        }
        if !is_identifier(key) {
            return Err(invalid("key is not a valid identifier"));
        }
        if KEYWORDS.contains(&key) {
            return Err(invalid(&format!("`{key}` is a reserved word")));
        }

        Ok(self.with(key, value))
    }

    /// Get a value if it is bound.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
