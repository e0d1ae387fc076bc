//! Core types for Keystone
//!
//! This crate defines the pieces shared by every other Keystone crate:
//! - [`codec`]: fixed-width big-endian integer encoding for on-disk headers
//! - [`error`]: cache and XID file error types
//! - [`types`]: transaction identifiers and status

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod types;

pub use error::{CacheError, XidFileError, XidResult};
pub use types::{TransactionStatus, Xid, SUPER_XID};
