//! Tests for the locks subsystem.

use super::*;
use crate::error::FsError;
use std::os::unix::fs::PermissionsExt;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn lock_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("test.lock")
}

#[test]
fn test_open_creates_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    let handle = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();

    assert!(path.exists());
    assert!(!handle.is_locked());
    assert_eq!(handle.path(), path);
    assert_eq!(handle.mode(), LockMode::Exclusive);
}

#[test]
fn test_open_with_permissions_applies_mode() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    LockHandle::open_or_create_with_permissions(&path, LockMode::Exclusive, 0o600).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_open_empty_path_fails() {
    let err = LockHandle::open_or_create("", LockMode::Exclusive).unwrap_err();
    assert!(matches!(err, FsError::PathMissing));
}

#[test]
fn test_open_in_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no").join("such").join("dir.lock");

    let err = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap_err();
    assert!(matches!(err, FsError::File { .. }));
    assert_eq!(err.raw_os_error(), Some(libc::ENOENT));
}

#[test]
fn test_lock_unlock_relock_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let handle = LockHandle::open_or_create(lock_path(&temp_dir), LockMode::Exclusive).unwrap();

    handle.lock().unwrap();
    assert!(handle.is_locked());

    handle.unlock().unwrap();
    assert!(!handle.is_locked());

    handle.lock().unwrap();
    assert!(handle.is_locked());
}

#[test]
fn test_lock_and_unlock_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let handle = LockHandle::open_or_create(lock_path(&temp_dir), LockMode::Exclusive).unwrap();

    handle.unlock().unwrap();
    handle.lock().unwrap();
    handle.lock().unwrap();
    assert!(handle.is_locked());

    handle.unlock().unwrap();
    handle.unlock().unwrap();
    assert!(!handle.is_locked());
}

#[test]
fn test_try_lock_fails_when_held_elsewhere() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    let holder = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();
    let contender = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();

    holder.lock().unwrap();

    assert!(!contender.try_lock().unwrap());
    assert!(!contender.is_locked());

    holder.unlock().unwrap();
    assert!(contender.try_lock().unwrap());
    assert!(contender.is_locked());
}

#[test]
fn test_shared_locks_coexist_but_block_exclusive() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    let reader_a = LockHandle::open_or_create(&path, LockMode::Shared).unwrap();
    let reader_b = LockHandle::open_or_create(&path, LockMode::Shared).unwrap();
    let writer = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();

    assert!(reader_a.try_lock().unwrap());
    assert!(reader_b.try_lock().unwrap());
    assert!(!writer.try_lock().unwrap());

    reader_a.unlock().unwrap();
    reader_b.unlock().unwrap();
    assert!(writer.try_lock().unwrap());
}

#[test]
fn test_clones_share_lock_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    let original = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();
    let copy = original.clone();
    assert_eq!(original.share_count(), 2);

    original.lock().unwrap();
    assert!(copy.is_locked());

    copy.unlock().unwrap();
    assert!(!original.is_locked());
}

#[test]
fn test_dropping_one_clone_keeps_lock() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    let original = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();
    let copy = original.clone();
    original.lock().unwrap();
    drop(original);

    let contender = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();
    assert!(!contender.try_lock().unwrap());

    // Last clone gone: the descriptor closes and the kernel drops the lock
    drop(copy);
    assert!(contender.try_lock().unwrap());
}

#[test]
fn test_scoped_guard_releases_on_drop() {
    let temp_dir = TempDir::new().unwrap();
    let handle = LockHandle::open_or_create(lock_path(&temp_dir), LockMode::Exclusive).unwrap();

    {
        let guard = handle.scoped().unwrap();
        assert!(guard.handle().is_locked());
    }

    assert!(!handle.is_locked());
}

#[test]
fn test_scoped_guard_releases_on_error_path() {
    fn failing(handle: &LockHandle) -> crate::error::Result<()> {
        let _guard = handle.scoped()?;
        Err(FsError::PathMissing)
    }

    let temp_dir = TempDir::new().unwrap();
    let handle = LockHandle::open_or_create(lock_path(&temp_dir), LockMode::Exclusive).unwrap();

    assert!(failing(&handle).is_err());
    assert!(!handle.is_locked());
}

#[test]
fn test_guard_manual_release() {
    let temp_dir = TempDir::new().unwrap();
    let handle = LockHandle::open_or_create(lock_path(&temp_dir), LockMode::Exclusive).unwrap();

    let guard = handle.scoped().unwrap();
    guard.release().unwrap();

    assert!(!handle.is_locked());
}

#[test]
fn test_try_scoped_returns_none_when_contended() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    let holder = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();
    let _guard = holder.scoped().unwrap();

    let contender = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();
    assert!(contender.try_scoped().unwrap().is_none());
}

#[test]
fn test_blocking_lock_waits_for_release() {
    let temp_dir = TempDir::new().unwrap();
    let path = lock_path(&temp_dir);

    let holder = LockHandle::open_or_create(&path, LockMode::Exclusive).unwrap();
    holder.lock().unwrap();

    let (tx, rx) = mpsc::channel();
    let waiter_path = path.clone();
    let waiter = thread::spawn(move || {
        let contender = LockHandle::open_or_create(&waiter_path, LockMode::Exclusive).unwrap();
        contender.lock().unwrap();
        tx.send(()).unwrap();
    });

    // The waiter must still be blocked while the holder keeps the lock
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

    holder.unlock().unwrap();
    rx.recv_timeout(Duration::from_secs(10)).unwrap();
    waiter.join().unwrap();
}
