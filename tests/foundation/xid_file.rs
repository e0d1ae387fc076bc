//! XID file lifecycle: create, begin, finalize, reopen, corruption.

use crate::common::*;
use keystone::{TransactionManager, XidFileError, SUPER_XID};
use std::fs::OpenOptions;

#[test]
fn begin_returns_dense_ids() {
    let file = TestXidFile::new();
    let tm = file.create();
    let ids: Vec<u64> = (0..10).map(|_| tm.begin()).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[test]
fn super_transaction_semantics_hold_on_any_file() {
    let file = TestXidFile::new();
    let tm = file.create();
    tm.begin();
    for _ in 0..2 {
        assert!(!tm.is_active(SUPER_XID));
        assert!(tm.is_committed(SUPER_XID));
        assert!(!tm.is_aborted(SUPER_XID));
    }
}

#[test]
fn commit_and_abort_survive_reopen() {
    let file = TestXidFile::new();
    let tm = file.create();
    assert_eq!(tm.begin(), 1);
    assert_eq!(tm.begin(), 2);
    tm.commit(1);
    tm.abort(2);
    tm.close();

    let tm = file.open();
    assert!(tm.is_committed(1));
    assert!(tm.is_aborted(2));
    assert!(!tm.is_active(1));
    assert!(!tm.is_active(2));
    assert_eq!(file.len(), 8 + 2);
}

#[test]
fn active_transaction_stays_active_across_reopen() {
    let file = TestXidFile::new();
    let tm = file.create();
    let xid = tm.begin();
    tm.close();

    let tm = file.open();
    assert!(tm.is_active(xid));
    tm.commit(xid);
    assert!(tm.is_committed(xid));
}

#[test]
fn create_refuses_existing_file() {
    let file = TestXidFile::new();
    let tm = file.create();
    tm.begin();
    tm.commit(1);
    tm.close();
    let before = std::fs::read(&file.path).unwrap();

    let err: keystone::Error = TransactionManager::try_create(&file.path)
        .unwrap_err()
        .into();
    assert!(matches!(
        err,
        keystone::Error::XidFile(XidFileError::AlreadyExists { .. })
    ));
    assert_eq!(std::fs::read(&file.path).unwrap(), before);
}

#[test]
fn truncated_file_is_detected() {
    let file = TestXidFile::new();
    let tm = file.create();
    tm.begin();
    tm.begin();
    tm.close();

    let handle = OpenOptions::new().write(true).open(&file.path).unwrap();
    handle.set_len(file.len() - 1).unwrap();
    drop(handle);

    let err: keystone::Error = TransactionManager::try_open(&file.path).unwrap_err().into();
    assert!(err.is_corruption());
}

#[test]
fn torn_begin_is_detected() {
    // Status byte of xid 3 reached disk, header still says 2
    let file = TestXidFile::new();
    let tm = file.create();
    tm.begin();
    tm.begin();
    tm.close();

    let handle = OpenOptions::new().write(true).open(&file.path).unwrap();
    handle.set_len(file.len() + 1).unwrap();
    drop(handle);

    let err = TransactionManager::try_open(&file.path).unwrap_err();
    assert!(matches!(
        err,
        XidFileError::LengthMismatch {
            file_len: 11,
            expected: 10,
            count: 2
        }
    ));
}
