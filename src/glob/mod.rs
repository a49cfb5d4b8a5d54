//! Glob expansion.
//!
//! The remover consumes glob expansion through the [`GlobExpander`] trait;
//! [`FsGlob`] is the filesystem-backed implementation built on `globset`
//! for matching and `walkdir` for traversal.
//!
//! ## Literal Path Matching
//!
//! Paths that may contain glob metacharacters must go through
//! [`escape_glob`] before being used as a pattern prefix:
//!
//! ```
//! use fsprims::glob::escape_glob;
//!
//! let pattern = format!("{}/**", escape_glob("/srv/output[v1]"));
//! assert_eq!(pattern, r"/srv/output\[v1\]/**");
//! ```

mod expand;
mod flags;


pub use expand::FsGlob;
pub use flags::GlobFlags;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Expands a glob pattern into the sorted list of existing paths it names.
pub trait GlobExpander {
    fn expand(&self, pattern: &str, flags: GlobFlags) -> Result<Vec<PathBuf>>;

    /// Everything below `dir`, at any depth, sorted.
    ///
    /// Takes the directory as a path so names that are not valid UTF-8
    /// survive. The default walks the filesystem without following symlinks;
    /// only `include_dot_files` and `ignore_errors` apply.
    fn subtree(&self, dir: &Path, flags: GlobFlags) -> Result<Vec<PathBuf>> {
        expand::walk_subtree(dir, flags)
    }
}

impl<T: GlobExpander + ?Sized> GlobExpander for &T {
    fn expand(&self, pattern: &str, flags: GlobFlags) -> Result<Vec<PathBuf>> {
        (**self).expand(pattern, flags)
    }

    fn subtree(&self, dir: &Path, flags: GlobFlags) -> Result<Vec<PathBuf>> {
        (**self).subtree(dir, flags)
    }
}

/// Escape glob metacharacters so `s` matches only itself.
///
/// Escapes `\`, `*`, `?`, `[`, `]`, `{`, `}` and `!` with a backslash.
pub fn escape_glob(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '*' | '?' | '[' | ']' | '{' | '}' | '!') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
