//! XID file layout and positioned I/O
//!
//! ```text
//! offset 0        8        9        10
//!        ┌────────┬────────┬────────┬─ ─ ─
//!        │ count  │ xid 1  │ xid 2  │ ...
//!        │ u64 BE │ status │ status │
//!        └────────┴────────┴────────┴─ ─ ─
//! ```
//!
//! A well-formed file is exactly `XID_HEADER_LEN + count * XID_FIELD_SIZE`
//! bytes long. All reads and writes carry an explicit offset; the file's
//! shared cursor is never used.

use keystone_core::Xid;
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Length of the transaction count header
pub const XID_HEADER_LEN: u64 = 8;

/// Bytes per transaction status slot
pub const XID_FIELD_SIZE: u64 = 1;

/// File name suffix for XID files
pub const XID_SUFFIX: &str = ".xid";

/// Path of the XID file belonging to `base`
///
/// ```
/// use keystone_concurrency::xid_file_path;
///
/// assert_eq!(xid_file_path("/data/db").to_str(), Some("/data/db.xid"));
/// ```
pub fn xid_file_path(base: impl AsRef<Path>) -> PathBuf {
    let mut name: OsString = base.as_ref().as_os_str().to_owned();
    name.push(XID_SUFFIX);
    PathBuf::from(name)
}

/// Offset of the status slot for `xid` (xid >= 1)
#[inline]
pub(crate) fn xid_position(xid: Xid) -> u64 {
    XID_HEADER_LEN + (xid - 1) * XID_FIELD_SIZE
}

/// File length implied by a header count, `None` on overflow
#[inline]
pub(crate) fn expected_len(count: u64) -> Option<u64> {
    count
        .checked_mul(XID_FIELD_SIZE)
        .and_then(|slots| slots.checked_add(XID_HEADER_LEN))
}

#[cfg(unix)]
pub(crate) fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
pub(crate) fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
pub(crate) fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                let rest = buf;
                buf = &mut rest[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(windows)]
pub(crate) fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ))
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
