//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use distgen_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{DistgenError, DistgenResult},
};
use tracing::debug;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> DistgenResult<String> {
        debug!(path = %path.display(), "Reading file");
        std::fs::read_to_string(path).map_err(|e| map_read_error(path, e))
    }

    fn write_file(&self, path: &Path, content: &str) -> DistgenResult<()> {
        debug!(path = %path.display(), bytes = content.len(), "Writing file");
        std::fs::write(path, content).map_err(|e| {
            ApplicationError::WriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn map_read_error(path: &Path, e: io::Error) -> DistgenError {
    let path = path.to_path_buf();
    match e.kind() {
        io::ErrorKind::NotFound => ApplicationError::TemplateNotFound { path },
        // `read_to_string` reports non-UTF-8 content as InvalidData.
        io::ErrorKind::InvalidData => ApplicationError::InvalidEncoding { path },
        _ => ApplicationError::ReadFailed {
            path,
            reason: e.to_string(),
        },
    }
    .into()
}
