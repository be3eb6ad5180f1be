//! Application layer errors.
//!
//! These errors represent failures in orchestration (mostly I/O), not
//! template logic. Template errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::error::ErrorCategory;

/// Errors that occur while reading, rendering, or writing files.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The template file does not exist.
    #[error("Template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    /// The template file exists but could not be read.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// The template file is not valid UTF-8.
    #[error("Template {path} is not valid UTF-8 text")]
    InvalidEncoding { path: PathBuf },

    /// The template was read but rejected by the template engine.
    #[error("Invalid template {path}: {source}")]
    InvalidTemplate {
        path: PathBuf,
        #[source]
        source: DomainError,
    },

    /// The output file could not be created or written.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// An in-memory adapter lock was poisoned.
    #[error("Filesystem lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { path } => vec![
                format!("No file at: {}", path.display()),
                "Pass the template explicitly with --template <path>".into(),
                "Paths are relative to the current directory".into(),
            ],
            Self::ReadFailed { path, .. } => vec![
                format!("Failed to read: {}", path.display()),
                "Check that you have read permissions".into(),
            ],
            Self::InvalidEncoding { .. } => {
                vec!["Save the template as UTF-8 text".into()]
            }
            Self::InvalidTemplate { source, .. } => source.suggestions(),
            Self::WriteFailed { path, .. } => vec![
                format!("Failed to write: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::LockPoisoned => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::ReadFailed { .. } | Self::InvalidEncoding { .. } | Self::WriteFailed { .. } => {
                ErrorCategory::Io
            }
            Self::InvalidTemplate { source, .. } => source.category().into(),
            Self::LockPoisoned => ErrorCategory::Internal,
        }
    }
}
