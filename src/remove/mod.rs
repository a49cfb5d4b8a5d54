//! Recursive removal of glob-selected trees.
//!
//! A pattern is expanded, every matched directory contributes its whole
//! subtree, and the resulting worklist is deleted deepest path first so
//! directories are empty by the time they are removed.
//!
//! # Special files
//!
//! FIFOs, sockets and device nodes are handled by a [`SpecialFilePolicy`].
//! A preserved special file also preserves every ancestor directory in the
//! worklist, since those can never become empty.
//!
//! # Failure handling
//!
//! By default the first failure aborts the pass. With `keep_going` the pass
//! runs to the end and the first failure is returned afterwards. An entry of
//! unknown type always aborts.
//!
//! Nothing is locked during a pass; concurrent changes to the same tree may
//! race with it.

mod operations;
mod policy;


pub use operations::{RemoveOptions, RemoveReport, remove_tree, remove_tree_with};
pub use policy::{Disposition, EntryKind, SpecialFilePolicy};
