//! Fatal error path for the XID file
//!
//! Once the XID file's integrity is in doubt no visibility decision above it
//! can be trusted, so every failure reaching this module ends the process.

use keystone_core::{XidFileError, XidResult};
use tracing::error;

/// Log `err` and abort the process.
pub fn fatal(err: XidFileError) -> ! {
    error!(error = %err, "xid file integrity lost, aborting");
    eprintln!("keystone: fatal: {}", err);
    std::process::abort()
}

/// Route an XID file result to [`fatal`] on error.
pub(crate) trait OrFatal<T> {
    fn or_fatal(self) -> T;
}

impl<T> OrFatal<T> for XidResult<T> {
    #[inline]
    fn or_fatal(self) -> T {
        match self {
            Ok(value) => value,
            Err(e) => fatal(e),
        }
    }
}
