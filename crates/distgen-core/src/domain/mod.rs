// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for distgen.
//!
//! This module contains the template language and the pure rendering logic.
//! All I/O concerns are handled via ports (traits) defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable entities**: `Template` and `Bindings` never change after construction
//! - **Pure rendering**: `render(template, bindings)` has no side effects
pub mod entities;
pub mod error;
pub mod template;
pub mod value_objects;

// Re-exports for convenience
pub use entities::{
    bindings::{Bindings, NETWORK_KEY},
    rendered::RenderedOutput,
};

pub use error::{DomainError, ErrorCategory};

pub use template::Template;

pub use value_objects::{MissingVariablePolicy, Network};
