//! Transaction manager over the XID file
//!
//! Allocates transaction ids and durably records each transaction's status
//! so that visibility logic in higher layers can ask whether the writer of a
//! version is active, committed, or aborted.
//!
//! ## Begin Sequence
//!
//! ```text
//! 1. Acquire allocation lock
//! 2. xid = count + 1
//! 3. Write status byte Active at 8 + (xid - 1), sync
//! 4. Write header count = xid, sync
//! 5. Publish count, release lock, return xid
//! ```
//!
//! The status byte lands before the header advances. A crash between steps 3
//! and 4 leaves the file one byte longer than the header implies, which the
//! next open rejects as corruption.
//!
//! ## Failure Posture
//!
//! Every I/O or integrity failure is fatal: it goes through
//! [`fatal`](crate::fatal::fatal) and aborts the process. Only
//! [`TransactionManager::try_create`] and [`TransactionManager::try_open`]
//! hand the error back to the caller.

use crate::fatal::OrFatal;
use crate::xid_file::{expected_len, read_exact_at, write_all_at, xid_position, XID_HEADER_LEN};
use keystone_core::codec::{bytes_to_u64, u64_to_bytes, U64_LEN};
use keystone_core::{TransactionStatus, Xid, XidFileError, XidResult, SUPER_XID};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Allocates transaction ids and persists their status.
///
/// # Thread Safety
///
/// Only id allocation in [`begin`](Self::begin) is serialized. Status writes
/// and reads are single positioned byte operations and are not coordinated
/// with each other.
pub struct TransactionManager {
    file: File,
    path: PathBuf,

    /// Number of xids ever allocated, mirrors the file header
    xid_count: AtomicU64,

    /// Serializes id allocation
    alloc_lock: Mutex<()>,
}

impl TransactionManager {
    /// Create a new XID file at `path`.
    ///
    /// Aborts the process if the file already exists or cannot be read and
    /// written.
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self::try_create(path).or_fatal()
    }

    /// Open and validate the XID file at `path`.
    ///
    /// Aborts the process if the file is missing, unreadable, or its length
    /// disagrees with its header.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::try_open(path).or_fatal()
    }

    /// Create a new XID file at `path`, reporting failures to the caller.
    ///
    /// Writes a zero transaction count and syncs it before returning.
    pub fn try_create(path: impl AsRef<Path>) -> XidResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| open_error(e, path))?;

        Self::init_created(file, path)
    }

    /// Write the zero header into a file this call just created.
    ///
    /// The file is removed again on failure so a retry does not trip over
    /// `AlreadyExists`.
    fn init_created(file: File, path: &Path) -> XidResult<Self> {
        let init = || -> XidResult<()> {
            if file.metadata()?.permissions().readonly() {
                return Err(XidFileError::NotReadWrite {
                    path: path.to_path_buf(),
                });
            }
            write_all_at(&file, &u64_to_bytes(0), 0)?;
            file.sync_all()?;
            Ok(())
        };

        if let Err(e) = init() {
            drop(file);
            if let Err(remove_err) = fs::remove_file(path) {
                warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "failed to remove partial xid file"
                );
            }
            return Err(e);
        }
        info!(path = %path.display(), "created xid file");

        Ok(TransactionManager {
            file,
            path: path.to_path_buf(),
            xid_count: AtomicU64::new(0),
            alloc_lock: Mutex::new(()),
        })
    }

    /// Open the XID file at `path`, reporting failures to the caller.
    ///
    /// # Errors
    ///
    /// - [`XidFileError::ShortHeader`] if the file is shorter than its header
    /// - [`XidFileError::LengthMismatch`] if the length is not
    ///   `8 + count` bytes
    pub fn try_open(path: impl AsRef<Path>) -> XidResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| open_error(e, path))?;

        let file_len = file.metadata()?.len();
        if file_len < XID_HEADER_LEN {
            return Err(XidFileError::ShortHeader {
                file_len,
                header_len: XID_HEADER_LEN,
            });
        }

        let mut header = [0u8; U64_LEN];
        read_exact_at(&file, &mut header, 0)?;
        let count = bytes_to_u64(&header);

        match expected_len(count) {
            Some(expected) if expected == file_len => {}
            expected => {
                return Err(XidFileError::LengthMismatch {
                    file_len,
                    expected: expected.unwrap_or(u64::MAX),
                    count,
                })
            }
        }

        info!(path = %path.display(), xid_count = count, "opened xid file");
        Ok(TransactionManager {
            file,
            path: path.to_path_buf(),
            xid_count: AtomicU64::new(count),
            alloc_lock: Mutex::new(()),
        })
    }

    /// Start a transaction and return its id.
    ///
    /// Ids are dense: the n-th call on a fresh file returns n.
    pub fn begin(&self) -> Xid {
        self.allocate().or_fatal()
    }

    /// Mark `xid` committed. Irreversible.
    pub fn commit(&self, xid: Xid) {
        self.finalize(xid, TransactionStatus::Committed).or_fatal()
    }

    /// Mark `xid` aborted. Irreversible.
    pub fn abort(&self, xid: Xid) {
        self.finalize(xid, TransactionStatus::Aborted).or_fatal()
    }

    /// Whether `xid` is still running. Always false for the super transaction.
    pub fn is_active(&self, xid: Xid) -> bool {
        xid != SUPER_XID && self.status(xid) == TransactionStatus::Active
    }

    /// Whether `xid` committed. Always true for the super transaction.
    pub fn is_committed(&self, xid: Xid) -> bool {
        self.status(xid) == TransactionStatus::Committed
    }

    /// Whether `xid` aborted. Always false for the super transaction.
    pub fn is_aborted(&self, xid: Xid) -> bool {
        xid != SUPER_XID && self.status(xid) == TransactionStatus::Aborted
    }

    /// Status of `xid`, read from the file.
    pub fn status(&self, xid: Xid) -> TransactionStatus {
        if xid == SUPER_XID {
            return TransactionStatus::Committed;
        }
        self.check_allocated(xid)
            .and_then(|_| self.read_status(xid))
            .or_fatal()
    }

    /// Number of transactions ever allocated.
    pub fn xid_count(&self) -> u64 {
        self.xid_count.load(Ordering::Acquire)
    }

    /// Path of the backing XID file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync and release the file handle.
    pub fn close(self) {
        self.file.sync_all().map_err(XidFileError::from).or_fatal();
        debug!(path = %self.path.display(), "closed xid file");
    }

    fn allocate(&self) -> XidResult<Xid> {
        let _guard = self.alloc_lock.lock();
        let xid = self.xid_count.load(Ordering::Acquire) + 1;

        self.write_status(xid, TransactionStatus::Active)?;
        write_all_at(&self.file, &u64_to_bytes(xid), 0)?;
        self.file.sync_data()?;

        self.xid_count.store(xid, Ordering::Release);
        debug!(xid, "began transaction");
        Ok(xid)
    }

    fn finalize(&self, xid: Xid, to: TransactionStatus) -> XidResult<()> {
        if xid == SUPER_XID {
            let op = match to {
                TransactionStatus::Aborted => "abort",
                _ => "commit",
            };
            return Err(XidFileError::SuperXid { op });
        }
        self.check_allocated(xid)?;

        let from = self.read_status(xid)?;
        if from != TransactionStatus::Active {
            return Err(XidFileError::IllegalTransition { xid, from, to });
        }

        self.write_status(xid, to)?;
        debug!(xid, status = %to, "finalized transaction");
        Ok(())
    }

    fn check_allocated(&self, xid: Xid) -> XidResult<()> {
        let count = self.xid_count();
        if xid > count {
            return Err(XidFileError::UnknownXid { xid, count });
        }
        Ok(())
    }

    fn read_status(&self, xid: Xid) -> XidResult<TransactionStatus> {
        let mut byte = [0u8; 1];
        read_exact_at(&self.file, &mut byte, xid_position(xid))?;
        TransactionStatus::from_byte(byte[0])
            .ok_or(XidFileError::BadStatusByte { xid, byte: byte[0] })
    }

    fn write_status(&self, xid: Xid, status: TransactionStatus) -> XidResult<()> {
        write_all_at(&self.file, &[status.as_byte()], xid_position(xid))?;
        self.file.sync_data()?;
        Ok(())
    }
}

fn open_error(e: std::io::Error, path: &Path) -> XidFileError {
    match e.kind() {
        ErrorKind::AlreadyExists => XidFileError::AlreadyExists {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => XidFileError::NotReadWrite {
            path: path.to_path_buf(),
        },
        _ => XidFileError::Io(e),
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("path", &self.path)
            .field("xid_count", &self.xid_count())
            .finish()
    }
}
