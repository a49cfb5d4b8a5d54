//! Reference-counted lock handle.

use super::guard::LockGuard;
use super::types::LockMode;
use crate::config::types::DEFAULT_FILE_MODE;
use crate::error::{FsError, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug)]
struct LockState {
    file: File,
    path: PathBuf,
    mode: LockMode,
    locked: AtomicBool,
}

/// Handle to an advisory lock on a file.
///
/// Clones share the same descriptor and lock state.
#[derive(Debug, Clone)]
pub struct LockHandle {
    state: Arc<LockState>,
}

impl LockHandle {
    /// Open `path` for locking, creating it with `rw-rw-r--` if missing.
    ///
    /// The lock is not acquired; call [`lock`](Self::lock) or
    /// [`try_lock`](Self::try_lock).
    ///
    /// # Errors
    ///
    /// * `FsError::PathMissing` - `path` is empty
    /// * `FsError::File` - the file could not be opened or created
    pub fn open_or_create<P: AsRef<Path>>(path: P, mode: LockMode) -> Result<Self> {
        Self::open_or_create_with_permissions(path, mode, DEFAULT_FILE_MODE)
    }

    /// Like [`open_or_create`](Self::open_or_create) with explicit permission
    /// bits for a newly created file (the process umask still applies).
    pub fn open_or_create_with_permissions<P: AsRef<Path>>(
        path: P,
        mode: LockMode,
        permissions: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FsError::PathMissing);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(permissions)
            .open(path)
            .map_err(|source| FsError::File {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            state: Arc::new(LockState {
                file,
                path: path.to_path_buf(),
                mode,
                locked: AtomicBool::new(false),
            }),
        })
    }

    /// Block until the lock is held. No-op if this handle already holds it.
    ///
    /// Interrupted waits are retried.
    pub fn lock(&self) -> Result<()> {
        if self.is_locked() {
            return Ok(());
        }

        loop {
            match flock(&self.state.file, self.state.mode.operation()) {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.lock_error(e)),
            }
        }

        self.state.locked.store(true, Ordering::Release);
        debug!(path = %self.state.path.display(), mode = self.state.mode.as_str(), "lock acquired");
        Ok(())
    }

    /// Try to take the lock without blocking.
    ///
    /// Returns `Ok(false)` when another open file description holds a
    /// conflicting lock; the handle is left unlocked in that case.
    pub fn try_lock(&self) -> Result<bool> {
        if self.is_locked() {
            return Ok(true);
        }

        loop {
            match flock(&self.state.file, self.state.mode.operation() | libc::LOCK_NB) {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.lock_error(e)),
            }
        }

        self.state.locked.store(true, Ordering::Release);
        debug!(path = %self.state.path.display(), mode = self.state.mode.as_str(), "lock acquired without waiting");
        Ok(true)
    }

    /// Release the lock. No-op if not locked.
    pub fn unlock(&self) -> Result<()> {
        if !self.is_locked() {
            return Ok(());
        }

        flock(&self.state.file, libc::LOCK_UN).map_err(|e| self.lock_error(e))?;
        self.state.locked.store(false, Ordering::Release);
        debug!(path = %self.state.path.display(), "lock released");
        Ok(())
    }

    /// Lock and return a guard that unlocks when dropped.
    pub fn scoped(&self) -> Result<LockGuard> {
        self.lock()?;
        Ok(LockGuard::new(self.clone()))
    }

    /// Non-blocking form of [`scoped`](Self::scoped).
    pub fn try_scoped(&self) -> Result<Option<LockGuard>> {
        if self.try_lock()? {
            Ok(Some(LockGuard::new(self.clone())))
        } else {
            Ok(None)
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state.locked.load(Ordering::Acquire)
    }

    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn mode(&self) -> LockMode {
        self.state.mode
    }

    /// The underlying file, for I/O performed under the lock.
    pub fn file(&self) -> &File {
        &self.state.file
    }

    /// Number of live clones sharing this descriptor.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.state)
    }

    fn lock_error(&self, source: io::Error) -> FsError {
        FsError::Lock {
            path: self.state.path.clone(),
            source,
        }
    }
}

fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
    // SAFETY: the descriptor belongs to `file`, which outlives the call.
    let rc = unsafe { libc::flock(file.as_raw_fd(), operation) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
