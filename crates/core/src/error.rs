//! Error types for Keystone
//!
//! Two families with opposite recovery postures:
//!
//! - [`CacheError`]: ordinary, recoverable conditions returned to the caller.
//! - [`XidFileError`]: integrity failures of the XID file. The transaction
//!   manager routes these to a fatal handler that terminates the process;
//!   they are only observable as values through its `try_*` constructors.

use crate::types::{TransactionStatus, Xid};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the reference-counted cache
///
/// `E` is the error type of the cache's loader hook. Loader failures are
/// passed through unchanged inside [`CacheError::Load`].
#[derive(Debug, Error)]
pub enum CacheError<E> {
    /// Every slot is taken by a present or in-flight resource
    #[error("cache is full: {capacity} resources held")]
    Full {
        /// Configured maximum number of resources
        capacity: usize,
    },

    /// The loader hook failed
    #[error("resource load failed: {0}")]
    Load(#[source] E),

    /// `release` was called for a key the cache does not hold
    #[error("key {key} is not held by the cache")]
    NotHeld {
        /// The offending key
        key: u64,
    },
}

impl<E> CacheError<E> {
    /// Check if this error is retryable.
    ///
    /// A full cache may have room again once other holders release.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CacheError::Full { .. })
    }

    /// Check if this is a capacity error.
    pub fn is_full(&self) -> bool {
        matches!(self, CacheError::Full { .. })
    }

    /// Unwrap the loader's error, if this is one
    pub fn into_load_error(self) -> Option<E> {
        match self {
            CacheError::Load(e) => Some(e),
            _ => None,
        }
    }
}

/// XID file integrity errors
#[derive(Debug, Error)]
pub enum XidFileError {
    /// `create` target already exists
    #[error("xid file already exists: {}", path.display())]
    AlreadyExists {
        /// Path that was requested
        path: PathBuf,
    },

    /// The file cannot be both read and written
    #[error("xid file is not readable and writable: {}", path.display())]
    NotReadWrite {
        /// Path that was requested
        path: PathBuf,
    },

    /// File is shorter than its header
    #[error("bad xid file: {file_len} bytes is shorter than the {header_len}-byte header")]
    ShortHeader {
        /// Actual file length
        file_len: u64,
        /// Required header length
        header_len: u64,
    },

    /// File length disagrees with the header's transaction count
    #[error("bad xid file: length {file_len} does not match {expected} implied by {count} transactions")]
    LengthMismatch {
        /// Actual file length
        file_len: u64,
        /// Length implied by the header
        expected: u64,
        /// Transaction count read from the header
        count: u64,
    },

    /// A status slot holds a byte outside the known statuses
    #[error("bad xid file: status byte {byte:#04x} for xid {xid}")]
    BadStatusByte {
        /// Transaction whose slot is damaged
        xid: Xid,
        /// Byte found on disk
        byte: u8,
    },

    /// The xid has never been allocated
    #[error("xid {xid} has not been allocated (count is {count})")]
    UnknownXid {
        /// Requested transaction
        xid: Xid,
        /// Number of allocated transactions
        count: u64,
    },

    /// Attempt to change the status of the Super Transaction
    #[error("cannot {op} the super transaction")]
    SuperXid {
        /// Attempted operation
        op: &'static str,
    },

    /// Status change out of a terminal state
    #[error("xid {xid} cannot move from {from} to {to}")]
    IllegalTransition {
        /// Transaction being finalized
        xid: Xid,
        /// Current status
        from: TransactionStatus,
        /// Requested status
        to: TransactionStatus,
    },

    /// Underlying I/O failure
    #[error("xid file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl XidFileError {
    /// Check if this error means the file contents cannot be trusted.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            XidFileError::ShortHeader { .. }
                | XidFileError::LengthMismatch { .. }
                | XidFileError::BadStatusByte { .. }
        )
    }
}

/// Result type for XID file operations.
pub type XidResult<T> = std::result::Result<T, XidFileError>;
