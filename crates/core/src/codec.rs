//! Fixed-width integer encoding
//!
//! Every integer Keystone persists is stored as 8 big-endian bytes. The XID
//! file header is the only current user.

use byteorder::{BigEndian, ByteOrder};

/// Width in bytes of an encoded `u64`
pub const U64_LEN: usize = 8;

/// Encode `value` as 8 big-endian bytes
#[inline]
pub fn u64_to_bytes(value: u64) -> [u8; U64_LEN] {
    let mut buf = [0u8; U64_LEN];
    BigEndian::write_u64(&mut buf, value);
    buf
}

/// Decode 8 big-endian bytes
#[inline]
pub fn bytes_to_u64(buf: &[u8; U64_LEN]) -> u64 {
    BigEndian::read_u64(buf)
}

/// Decode the first 8 bytes of `buf`
///
/// Returns `None` if `buf` is shorter than 8 bytes. Trailing bytes are ignored.
pub fn read_u64(buf: &[u8]) -> Option<u64> {
    if buf.len() < U64_LEN {
        return None;
    }
    Some(BigEndian::read_u64(&buf[..U64_LEN]))
}
