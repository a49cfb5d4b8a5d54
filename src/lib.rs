//! fsprims: small filesystem primitives built on advisory locking.
//!
//! The crate provides three independent pieces:
//! - [`locks`]: whole-file advisory locks (`flock`) behind a reference-counted handle
//! - [`counter`]: 128-bit monotonic counters stored in fixed slots of a shared file
//! - [`remove`]: glob-driven recursive removal with a policy for special files
//!
//! Glob expansion is consumed through the [`glob::GlobExpander`] trait so the
//! remover can be driven by any expansion backend.

pub mod config;
pub mod counter;
pub mod error;
pub mod glob;
pub mod locks;
pub mod remove;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use counter::{CounterFile, next_value};
pub use error::{FsError, Result};
pub use locks::{LockGuard, LockHandle, LockMode};
pub use remove::{RemoveOptions, RemoveReport, SpecialFilePolicy, remove_tree, remove_tree_with};
