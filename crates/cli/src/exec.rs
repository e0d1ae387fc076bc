//! Execute parsed actions against an XID file.
//!
//! Files are opened through `try_create`/`try_open` and transitions are
//! checked up front, so operator mistakes come back as messages instead of
//! tripping the transaction manager's fatal path.

use crate::parse::Action;
use keystone_concurrency::{TransactionManager, TransactionStatus, Xid, XidFileError, SUPER_XID};
use serde::Serialize;
use std::path::Path;

/// One row of an inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxnRow {
    pub xid: Xid,
    pub status: TransactionStatus,
}

/// Result of running an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    Created {
        path: String,
    },
    Began {
        xid: Xid,
    },
    Finalized {
        xid: Xid,
        status: TransactionStatus,
    },
    Status {
        xid: Xid,
        status: TransactionStatus,
    },
    Inspection {
        path: String,
        xid_count: u64,
        transactions: Vec<TxnRow>,
    },
}

/// Run `action`.
pub fn execute(action: Action) -> Result<Output, String> {
    match action {
        Action::Create { path } => {
            let tm = TransactionManager::try_create(&path).map_err(|e| e.to_string())?;
            tm.close();
            Ok(Output::Created {
                path: path.display().to_string(),
            })
        }
        Action::Inspect { path } => {
            let tm = open(&path)?;
            let transactions = (1..=tm.xid_count())
                .map(|xid| TxnRow {
                    xid,
                    status: tm.status(xid),
                })
                .collect();
            let output = Output::Inspection {
                path: path.display().to_string(),
                xid_count: tm.xid_count(),
                transactions,
            };
            tm.close();
            Ok(output)
        }
        Action::Begin { path } => {
            let tm = open(&path)?;
            let xid = tm.begin();
            tm.close();
            Ok(Output::Began { xid })
        }
        Action::Commit { path, xid } => finalize(&path, xid, TransactionStatus::Committed),
        Action::Abort { path, xid } => finalize(&path, xid, TransactionStatus::Aborted),
        Action::Status { path, xid } => {
            let tm = open(&path)?;
            check_allocated(&tm, xid).map_err(|e| e.to_string())?;
            let status = tm.status(xid);
            tm.close();
            Ok(Output::Status { xid, status })
        }
    }
}

fn open(path: &Path) -> Result<TransactionManager, String> {
    TransactionManager::try_open(path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn check_allocated(tm: &TransactionManager, xid: Xid) -> Result<(), XidFileError> {
    if xid != SUPER_XID && xid > tm.xid_count() {
        return Err(XidFileError::UnknownXid {
            xid,
            count: tm.xid_count(),
        });
    }
    Ok(())
}

fn finalize(path: &Path, xid: Xid, to: TransactionStatus) -> Result<Output, String> {
    let tm = open(path)?;
    if xid == SUPER_XID {
        let op = match to {
            TransactionStatus::Aborted => "abort",
            _ => "commit",
        };
        return Err(XidFileError::SuperXid { op }.to_string());
    }
    check_allocated(&tm, xid).map_err(|e| e.to_string())?;

    let from = tm.status(xid);
    if from != TransactionStatus::Active {
        return Err(XidFileError::IllegalTransition { xid, from, to }.to_string());
    }

    match to {
        TransactionStatus::Aborted => tm.abort(xid),
        _ => tm.commit(xid),
    }
    tm.close();
    Ok(Output::Finalized { xid, status: to })
}
