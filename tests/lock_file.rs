//! Lock file behaviour. flock locks are held per open descriptor, so
//! a second acquisition from within the same process conflicts
//! exactly like one from another process would.

use fibd::lock_file::{LockFile, LockFileError};

#[test]
fn t_exclusive_acquisition_and_release() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fibd.pid");

    let lock = LockFile::acquire(&path).unwrap();
    assert_eq!(lock.path(), path);
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, format!("{}", std::process::id()));

    match LockFile::acquire(&path) {
        Err(LockFileError::AlreadyRunning(reported)) => assert_eq!(reported, path),
        other => panic!("expected AlreadyRunning, got {:?}", other.map(|_| ())),
    }
    // The failed attempt did not touch the contents.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);

    lock.release().unwrap();
    assert!(!path.exists());

    // After a clean stop a fresh acquisition succeeds right away.
    let lock = LockFile::acquire(&path).unwrap();
    lock.release().unwrap();
}

#[test]
fn t_created_with_owner_only_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fibd.pid");
    let lock = LockFile::acquire(&path).unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    lock.release().unwrap();
}

#[test]
fn t_acquire_over_a_stale_file() {
    // A leftover file from a crashed instance carries no flock; it is
    // simply taken over and rewritten.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fibd.pid");
    std::fs::write(&path, "99999\n").unwrap();

    let lock = LockFile::acquire(&path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        format!("{}", std::process::id())
    );
    lock.release().unwrap();
}
