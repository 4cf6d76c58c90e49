//!    Error handling
//!
//! This module provides error handling using anyhow.
//! Errors only travel as far as the boundary where they happen (store,
//! cache, CLI); the per-frame book systems never see them and degrade to
//! cached or placeholder state instead.

#[allow(unused_imports)]
pub use anyhow::{anyhow, bail, ensure, Context, Error};
use anyhow::Result;

/// Result type alias for convenience throughout the application
pub type BookResult<T> = Result<T>;

/// Helper functions for creating common error contexts
pub trait BookContext<T> {
    /// Add file operation context to an error
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> BookResult<T>;
}

impl<T, E> BookContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> BookResult<T> {
        self.with_context(|| {
            format!("Failed to {} file: {}", operation, path.as_ref().display())
        })
    }
}

/// Helper macro for a missing content record
#[macro_export]
macro_rules! record_not_found {
    ($id:expr) => {
        anyhow::anyhow!("No content record with id '{}'", $id)
    };
}
