//! Convenient imports for Keystone.
//!
//! ```
//! use keystone::prelude::*;
//!
//! let config = CacheConfig::bounded(16);
//! assert!(!config.is_unbounded());
//! ```

// Cache
pub use crate::{CacheConfig, CacheError, CacheSource, RefCache};

// Transactions
pub use crate::{xid_file_path, TransactionManager, TransactionStatus, Xid, SUPER_XID};

// Error handling
pub use crate::error::{Error, Result};
