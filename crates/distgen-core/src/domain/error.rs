// ============================================================================
// domain/error.rs - TEMPLATE & BINDING ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so they can be wrapped with file context upstream)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Template Errors
    // ========================================================================
    #[error("template syntax error at line {line}, column {column}: {message}")]
    TemplateSyntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("template references unbound variable '{name}'")]
    UnresolvedVariable { name: String },

    // ========================================================================
    // Binding Errors
    // ========================================================================
    #[error("invalid binding '{input}': {reason}")]
    InvalidBinding { input: String, reason: String },

    #[error("invalid network name '{name}': {reason}")]
    InvalidNetwork { name: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateSyntax { line, message, .. } => {
                let mut hints = vec![format!("Check the directive on line {line}")];
                if message.starts_with("unterminated") {
                    hints.push("Every '{{', '{%' and '{#' needs a matching '}}', '%}' or '#}'".into());
                }
                if message.contains("{% raw %}") || message.contains("unknown") {
                    hints.push(
                        "Wrap literal braces in {% raw %}...{% endraw %} to emit them verbatim"
                            .into(),
                    );
                }
                hints
            }
            Self::UnresolvedVariable { name } => vec![
                format!("Bind it on the command line: --define {name}=<value>"),
                "Or relax the policy with --on-missing empty".into(),
            ],
            Self::InvalidBinding { .. } => vec![
                "Bindings use the form KEY=VALUE, e.g. --define token=0xabc".into(),
                "Keys must start with a letter or '_' and contain only letters, digits and '_'"
                    .into(),
            ],
            Self::InvalidNetwork { .. } => vec![
                "Pass a single word such as: --network mainnet".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateSyntax { .. } => ErrorCategory::Syntax,
            Self::UnresolvedVariable { .. } => ErrorCategory::Unresolved,
            Self::InvalidBinding { .. } | Self::InvalidNetwork { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Unresolved,
    Validation,
}
