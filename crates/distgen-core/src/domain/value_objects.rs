//! Domain value objects: Network, MissingVariablePolicy.
//!
//! # Design
//!
//! Pure value types: equality-by-value, no identity. `Network` validates on
//! construction, so every instance is usable as a binding value.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Network ──────────────────────────────────────────────────────────────────

/// Name of the deployment network a contract is generated for.
///
/// Any single word is accepted; templates decide what a name means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Network(String);

impl Network {
    pub const DEFAULT: &'static str = "mainnet";

    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let invalid = |reason: &str| DomainError::InvalidNetwork {
            name: name.clone(),
            reason: reason.to_owned(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(invalid("name contains whitespace"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Network {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Network {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Network {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Network> for String {
    fn from(network: Network) -> Self {
        network.0
    }
}

// ── MissingVariablePolicy ────────────────────────────────────────────────────

/// What rendering does with a placeholder whose variable is not bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingVariablePolicy {
    /// Render as an empty string and report the name.
    #[default]
    Empty,
    /// Keep the placeholder text as written and report the name.
    Preserve,
    /// Fail with [`DomainError::UnresolvedVariable`].
    Strict,
}

impl MissingVariablePolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Preserve => "preserve",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for MissingVariablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
