//! The result of rendering a template.

use std::fmt;

/// Fully substituted text plus the names that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    text: String,
    unresolved: Vec<String>,
}

impl RenderedOutput {
    pub(crate) fn new(text: String, unresolved: Vec<String>) -> Self {
        Self { text, unresolved }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Sorted, de-duplicated names of unbound variables that were referenced.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// `true` when every referenced variable was bound.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl fmt::Display for RenderedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
