//! Foundation Integration Tests
//!
//! Exercises the public surface the way page, version, and visibility layers
//! consume it: a page cache with write-back over a backing store, the XID
//! file lifecycle across reopen, and visibility checks combining both.

mod common;
mod page_cache;
mod xid_file;
