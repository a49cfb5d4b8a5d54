//! RAII lock guard implementation.

use super::handle::LockHandle;
use crate::error::Result;
use std::fs::File;
use tracing::warn;

/// RAII guard for a held lock.
///
/// When dropped, the lock is released. If releasing fails, a warning is
/// logged but no panic occurs.
#[derive(Debug)]
pub struct LockGuard {
    handle: LockHandle,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    pub(super) fn new(handle: LockHandle) -> Self {
        Self {
            handle,
            released: false,
        }
    }

    pub fn handle(&self) -> &LockHandle {
        &self.handle
    }

    /// The locked file.
    pub fn file(&self) -> &File {
        self.handle.file()
    }

    /// Manually release the lock and report any failure.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.handle.unlock()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.handle.unlock()
        {
            warn!(
                path = %self.handle.path().display(),
                error = %e,
                "failed to release lock"
            );
        }
    }
}
