//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `distgen-adapters` crate provides implementations.

use crate::domain::{Bindings, RenderedOutput};
use crate::error::DistgenResult;
use std::path::Path;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `distgen_adapters::filesystem::LocalFilesystem` (production)
/// - `distgen_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Whole-file operations only: one read, one write, no streaming
/// - `write_file` creates or truncates, it never creates parent directories
pub trait Filesystem: Send + Sync {
    /// Read an entire UTF-8 file.
    fn read_to_string(&self, path: &Path) -> DistgenResult<String>;

    /// Create or overwrite a file with `content`.
    fn write_file(&self, path: &Path, content: &str) -> DistgenResult<()>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `distgen_adapters::renderer::PlaceholderRenderer` (built-in template language)
///
/// Callers only ever see this contract, so the engine behind it can be
/// swapped without touching the service or the CLI.
pub trait TemplateRenderer: Send + Sync {
    /// Render template `source` against `bindings`.
    ///
    /// # Errors
    ///
    /// `DistgenError::Domain` with `TemplateSyntax` for malformed directives,
    /// or `UnresolvedVariable` when the renderer is strict.
    fn render(&self, source: &str, bindings: &Bindings) -> DistgenResult<RenderedOutput>;
}
