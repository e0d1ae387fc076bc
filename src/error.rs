//! Unified error type for Keystone.
//!
//! Wraps the per-crate errors so callers that use both the cache and the
//! transaction manager can propagate with a single `?`.

use keystone_core::{CacheError, XidFileError};
use thiserror::Error;

/// All Keystone errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Cache has no free slot
    #[error("cache full: {capacity} resources held")]
    CacheFull {
        /// Configured capacity
        capacity: usize,
    },

    /// A cache loader failed; the loader's error is kept as the source
    #[error("cache load failed: {0}")]
    CacheLoad(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Release of a key the cache does not hold
    #[error("key {0} is not held by the cache")]
    NotHeld(u64),

    /// XID file error from a `try_*` constructor
    #[error(transparent)]
    XidFile(#[from] XidFileError),
}

/// Result type for Keystone operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// A full cache may accept the same request once holders release.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::CacheFull { .. })
    }

    /// Check if this error reports XID file corruption.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::XidFile(e) if e.is_corruption())
    }
}

impl<E> From<CacheError<E>> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: CacheError<E>) -> Self {
        match e {
            CacheError::Full { capacity } => Error::CacheFull { capacity },
            CacheError::Load(cause) => Error::CacheLoad(Box::new(cause)),
            CacheError::NotHeld { key } => Error::NotHeld(key),
        }
    }
}
