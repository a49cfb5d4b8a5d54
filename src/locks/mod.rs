//! Advisory locking for fsprims.
//!
//! Locks are whole-file `flock(2)` locks: cooperative, visible only to
//! processes that also lock the same file, and owned by the open file
//! description rather than by the process.
//!
//! # Handles
//!
//! A [`LockHandle`] owns one descriptor behind a reference count. Cloning a
//! handle shares the descriptor and the locked flag, so dropping one clone
//! does not release a lock that another clone still relies on. The kernel
//! drops the lock when the last clone closes the descriptor.
//!
//! # RAII Guards
//!
//! [`LockHandle::scoped`] returns a [`LockGuard`] that unlocks on every exit
//! path. If unlocking fails during drop, a warning is logged but the program
//! does not panic.
//!
//! Handles are not synchronized in-process; share them across threads only
//! with external synchronization.

mod guard;
mod handle;
mod types;

#[cfg(test)]
mod tests;

pub use guard::LockGuard;
pub use handle::LockHandle;
pub use types::LockMode;
