//! The removal pass.

use super::policy::{Disposition, EntryKind, SpecialFilePolicy};
use crate::config::Config;
use crate::error::{FsError, Result};
use crate::glob::{FsGlob, GlobExpander, GlobFlags};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Options for a removal pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOptions {
    pub special_files: SpecialFilePolicy,
    pub keep_going: bool,
    /// Flags for expanding the pattern. `allow_empty` is always forced on.
    pub glob_flags: GlobFlags,
}

impl RemoveOptions {
    pub fn new(special_files: SpecialFilePolicy, keep_going: bool) -> Self {
        Self {
            special_files,
            keep_going,
            glob_flags: GlobFlags::default(),
        }
    }
}

impl From<&Config> for RemoveOptions {
    fn from(config: &Config) -> Self {
        Self {
            special_files: config.remove.special_files,
            keep_going: config.remove.keep_going,
            glob_flags: config.glob,
        }
    }
}

/// What a successful pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveReport {
    /// Entries deleted, in deletion order.
    pub removed: Vec<PathBuf>,
    /// Special files kept by policy, and the ancestors kept with them.
    pub preserved: Vec<PathBuf>,
}

enum Outcome {
    Removed(EntryKind),
    Preserved,
    Gone,
}

/// Remove everything `pattern` names, expanding it with [`FsGlob`].
///
/// A pattern that matches nothing is success.
///
/// # Errors
///
/// * `FsError::PermissionDenied` - a special file is forbidden by `special_policy`
/// * `FsError::UnknownFileType` - an entry of unrecognized type (never deferred)
/// * `FsError::Io` - stat or unlink failed
pub fn remove_tree(pattern: &str, special_policy: SpecialFilePolicy, keep_going: bool) -> Result<()> {
    remove_tree_with(
        &FsGlob,
        pattern,
        &RemoveOptions::new(special_policy, keep_going),
    )
    .map(|_| ())
}

/// Remove everything `pattern` names, expanding it with `expander`.
///
/// With `SpecialFilePolicy::Error` and no `keep_going`, the worklist is
/// scanned first and nothing is deleted if any special file is present.
/// With `keep_going`, that scan is skipped and special files fail one by
/// one during the pass instead.
pub fn remove_tree_with<G: GlobExpander + ?Sized>(
    expander: &G,
    pattern: &str,
    options: &RemoveOptions,
) -> Result<RemoveReport> {
    let worklist = collect_worklist(expander, pattern, options.glob_flags)?;
    if worklist.is_empty() {
        debug!(pattern, "nothing to remove");
        return Ok(RemoveReport::default());
    }

    if options.special_files == SpecialFilePolicy::Error && !options.keep_going {
        prescan(&worklist)?;
    }

    delete_all(&worklist, options)
}

/// Expand `pattern`, add the subtree of every matched directory, and order
/// the result deepest path first.
fn collect_worklist<G: GlobExpander + ?Sized>(
    expander: &G,
    pattern: &str,
    flags: GlobFlags,
) -> Result<Vec<PathBuf>> {
    let flags = GlobFlags {
        allow_empty: true,
        ..flags
    };

    let mut entries = BTreeSet::new();
    for root in expander.expand(pattern, flags)? {
        let is_dir = fs::symlink_metadata(&root)
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if is_dir {
            entries.extend(expander.subtree(&root, flags)?);
        }
        entries.insert(root);
    }

    let mut worklist: Vec<PathBuf> = entries.into_iter().collect();
    worklist.sort_by(|a, b| {
        b.as_os_str()
            .len()
            .cmp(&a.as_os_str().len())
            .then_with(|| b.cmp(a))
    });
    Ok(worklist)
}

fn prescan(worklist: &[PathBuf]) -> Result<()> {
    for path in worklist {
        match fs::symlink_metadata(path) {
            Ok(meta) if EntryKind::of(meta.file_type()).is_special() => {
                return Err(FsError::PermissionDenied(path.clone()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(FsError::io(path, e)),
        }
    }
    Ok(())
}

fn delete_all(worklist: &[PathBuf], options: &RemoveOptions) -> Result<RemoveReport> {
    let members: HashSet<&Path> = worklist.iter().map(PathBuf::as_path).collect();
    let mut kept_dirs: HashSet<PathBuf> = HashSet::new();
    let mut report = RemoveReport::default();
    let mut first_error = None;

    for path in worklist {
        if kept_dirs.contains(path) {
            debug!(path = %path.display(), "keeping directory holding preserved entries");
            report.preserved.push(path.clone());
            continue;
        }

        match remove_entry(path, options.special_files) {
            Ok(Outcome::Removed(kind)) => {
                debug!(path = %path.display(), kind = kind.as_str(), "removed");
                report.removed.push(path.clone());
            }
            Ok(Outcome::Gone) => {}
            Ok(Outcome::Preserved) => {
                debug!(path = %path.display(), "preserving special file");
                report.preserved.push(path.clone());
                keep_ancestors(path, &members, &mut kept_dirs);
            }
            Err(e @ FsError::UnknownFileType(_)) => return Err(e),
            Err(e) if !options.keep_going => return Err(e),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "removal failed, continuing");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(report),
    }
}

/// Mark every worklist ancestor of `path` as kept, stopping at the first
/// ancestor outside the worklist.
fn keep_ancestors(path: &Path, members: &HashSet<&Path>, kept_dirs: &mut HashSet<PathBuf>) {
    for ancestor in path.ancestors().skip(1) {
        if !members.contains(ancestor) {
            break;
        }
        kept_dirs.insert(ancestor.to_path_buf());
    }
}

fn remove_entry(path: &Path, policy: SpecialFilePolicy) -> Result<Outcome> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::Gone),
        Err(e) => return Err(FsError::io(path, e)),
    };

    let kind = EntryKind::of(meta.file_type());
    if kind == EntryKind::Unknown {
        return Err(FsError::UnknownFileType(path.to_path_buf()));
    }

    match policy.disposition(kind) {
        Disposition::Deny => Err(FsError::PermissionDenied(path.to_path_buf())),
        Disposition::Preserve => Ok(Outcome::Preserved),
        Disposition::Remove => {
            let result = if kind == EntryKind::Directory {
                fs::remove_dir(path)
            } else {
                fs::remove_file(path)
            };
            match result {
                Ok(()) => Ok(Outcome::Removed(kind)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Outcome::Gone),
                Err(e) => Err(FsError::io(path, e)),
            }
        }
    }
}
