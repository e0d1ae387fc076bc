//! # Keystone
//!
//! Foundation layer of a small transactional storage engine.
//!
//! Keystone provides the two pieces every layer above it leans on:
//!
//! - [`RefCache`] - a capacity-bounded, reference-counted resource cache.
//!   Page and data-item layers implement [`CacheSource`] to supply loading
//!   and write-back.
//! - [`TransactionManager`] - allocates transaction ids and durably records
//!   whether each one is active, committed, or aborted, so visibility checks
//!   can be answered after a restart.
//!
//! ## Quick Start
//!
//! ```no_run
//! use keystone::prelude::*;
//!
//! let tm = TransactionManager::create(xid_file_path("./my-db"));
//! let xid = tm.begin();
//! assert!(tm.is_active(xid));
//! tm.commit(xid);
//! assert!(tm.is_committed(xid));
//! tm.close();
//! ```
//!
//! ## Failure Posture
//!
//! Cache errors are ordinary values ([`CacheError`]). XID file errors are
//! fatal: the transaction manager aborts the process rather than continue
//! on a log whose integrity is in doubt. Use
//! [`TransactionManager::try_open`] to inspect a file without that risk.

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use error::{Error, Result};

pub use keystone_core::codec;
pub use keystone_core::{CacheError, TransactionStatus, Xid, XidFileError, SUPER_XID};
pub use keystone_concurrency::{xid_file_path, TransactionManager, XID_SUFFIX};
pub use keystone_storage::{CacheConfig, CacheSource, RefCache};
