//! Infrastructure adapters for distgen.
//!
//! This crate implements the ports defined in `distgen-core::application::ports`.
//! It contains all I/O operations.

pub mod filesystem;
pub mod renderer;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::PlaceholderRenderer;
