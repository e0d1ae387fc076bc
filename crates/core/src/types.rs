//! Transaction identifiers and status
//!
//! - [`Xid`]: 1-based, densely allocated transaction identifier
//! - [`SUPER_XID`]: reserved id 0, always treated as committed
//! - [`TransactionStatus`]: the lifecycle state persisted per xid

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier
///
/// Ids start at 1 and are never reused. Id 0 is [`SUPER_XID`].
pub type Xid = u64;

/// The Super Transaction
///
/// A bootstrap sentinel meaning "no transaction". It is never active or
/// aborted and is always reported committed. It has no slot in the XID file.
pub const SUPER_XID: Xid = 0;

/// Lifecycle state of a transaction
///
/// Transitions are `Active -> Committed` or `Active -> Aborted`. Both
/// targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Began, not yet finalized
    Active,
    /// Finalized successfully
    Committed,
    /// Rolled back
    Aborted,
}

impl TransactionStatus {
    /// On-disk status byte
    #[inline]
    pub fn as_byte(self) -> u8 {
        match self {
            TransactionStatus::Active => 0,
            TransactionStatus::Committed => 1,
            TransactionStatus::Aborted => 2,
        }
    }

    /// Parse an on-disk status byte
    ///
    /// Returns `None` for bytes outside `{0, 1, 2}`.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TransactionStatus::Active),
            1 => Some(TransactionStatus::Committed),
            2 => Some(TransactionStatus::Aborted),
            _ => None,
        }
    }

    /// Whether this status can never change again
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Active)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStatus::Active => "active",
            TransactionStatus::Committed => "committed",
            TransactionStatus::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
