//! Concurrency layer for Keystone
//!
//! This crate implements transaction id allocation and status tracking:
//! - TransactionManager: begin/commit/abort and status queries over the XID file
//! - xid_file: on-disk layout and positioned I/O
//! - fatal: the single exit point for XID file integrity failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fatal;
pub mod manager;
pub mod xid_file;

pub use fatal::fatal;
pub use keystone_core::{TransactionStatus, Xid, XidFileError, SUPER_XID};
pub use manager::TransactionManager;
pub use xid_file::{xid_file_path, XID_HEADER_LEN, XID_SUFFIX};
