//! Unified error handling for Distgen Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, DomainError};

/// Root error type for Distgen Core operations.
#[derive(Debug, Error, Clone)]
pub enum DistgenError {
    /// Errors from the domain layer (template syntax, bindings).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (file access).
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl DistgenError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category().into(),
            Self::Application(e) => e.category(),
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed template directive.
    Syntax,
    /// Variable referenced but not bound (strict policy).
    Unresolved,
    /// Bad input value (binding or network name).
    Validation,
    /// Template file missing.
    NotFound,
    /// Read or write failure.
    Io,
    /// Broken invariant, such as a poisoned lock.
    Internal,
}

impl From<domain::ErrorCategory> for ErrorCategory {
    fn from(category: domain::ErrorCategory) -> Self {
        match category {
            domain::ErrorCategory::Syntax => Self::Syntax,
            domain::ErrorCategory::Unresolved => Self::Unresolved,
            domain::ErrorCategory::Validation => Self::Validation,
        }
    }
}

/// Convenient result type alias.
pub type DistgenResult<T> = Result<T, DistgenError>;
