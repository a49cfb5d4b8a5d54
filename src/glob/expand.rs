//! Filesystem-backed glob expansion.

use super::{GlobExpander, GlobFlags};
use crate::error::{FsError, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Expands patterns against the real filesystem.
///
/// Leading components without wildcards form the walk base; the rest is
/// matched component-wise (`*` never crosses `/`). Symlinks below the base
/// are reported but never followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGlob;

impl GlobExpander for FsGlob {
    fn expand(&self, pattern: &str, flags: GlobFlags) -> Result<Vec<PathBuf>> {
        let pattern = if flags.tilde_expand {
            expand_tilde(pattern, std::env::var_os("HOME").as_deref())
        } else {
            pattern.to_string()
        };

        let split = SplitPattern::parse(&pattern, flags);
        let mut matches = if split.remainder.is_empty() {
            match_literal(&split.base)
        } else {
            walk_matches(&pattern, &split, flags)?
        };

        if matches.is_empty() && !flags.allow_empty {
            return Err(FsError::NoMatch(pattern));
        }

        matches.sort();
        Ok(matches)
    }
}

/// Replace a leading `~` (alone or followed by `/`) with `home`.
///
/// `~user` forms are left untouched.
pub(crate) fn expand_tilde(pattern: &str, home: Option<&OsStr>) -> String {
    let Some(home) = home.and_then(OsStr::to_str) else {
        return pattern.to_string();
    };

    if pattern == "~" {
        home.to_string()
    } else if let Some(rest) = pattern.strip_prefix("~/") {
        format!("{}/{}", home.trim_end_matches('/'), rest)
    } else {
        pattern.to_string()
    }
}

/// A pattern split into its literal base directory and the wildcard tail.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SplitPattern {
    pub(crate) base: PathBuf,
    pub(crate) remainder: Vec<String>,
}

impl SplitPattern {
    pub(crate) fn parse(pattern: &str, flags: GlobFlags) -> Self {
        let mut base = PathBuf::new();
        if pattern.starts_with('/') {
            base.push("/");
        }

        let mut remainder = Vec::new();
        for component in pattern.split('/').filter(|c| !c.is_empty() && *c != ".") {
            if remainder.is_empty() && !has_wildcard(component, flags.brace_expand) {
                base.push(unescape(component));
                continue;
            }

            let mut component = if flags.brace_expand {
                component.to_string()
            } else {
                escape_braces(component)
            };
            if !flags.recursive {
                while component.contains("**") {
                    component = component.replace("**", "*");
                }
            }
            remainder.push(component);
        }

        Self { base, remainder }
    }

    fn max_depth(&self, flags: GlobFlags) -> usize {
        if flags.recursive && self.remainder.iter().any(|c| c.contains("**")) {
            usize::MAX
        } else {
            self.remainder.len()
        }
    }
}

fn match_literal(path: &Path) -> Vec<PathBuf> {
    if path.as_os_str().is_empty() || fs::symlink_metadata(path).is_err() {
        Vec::new()
    } else {
        vec![path.to_path_buf()]
    }
}

fn walk_matches(pattern: &str, split: &SplitPattern, flags: GlobFlags) -> Result<Vec<PathBuf>> {
    let relative = split.base.as_os_str().is_empty();
    let root = if relative {
        PathBuf::from(".")
    } else {
        split.base.clone()
    };

    // The base may itself be a symlink to a directory; follow it.
    match fs::metadata(&root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(Vec::new()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(_) if flags.ignore_errors => return Ok(Vec::new()),
        Err(e) => return Err(FsError::io(&root, e)),
    }

    let matcher = compile(pattern, &split.remainder.join("/"))?;
    let walker = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(split.max_depth(flags))
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| dot_entry_allowed(entry, &split.remainder, flags));

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if flags.ignore_errors => {
                debug!(error = %e, "skipping unreadable entry during glob expansion");
                continue;
            }
            Err(e) => return Err(walk_error(e)),
        };

        let Ok(rel) = entry.path().strip_prefix(&root) else {
            continue;
        };
        if matcher.is_match(rel) {
            matches.push(if relative {
                rel.to_path_buf()
            } else {
                entry.path().to_path_buf()
            });
        }
    }

    Ok(matches)
}

/// List every entry below `dir` without following symlinks.
pub(crate) fn walk_subtree(dir: &Path, flags: GlobFlags) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            flags.include_dot_files
                || entry.depth() == 0
                || !entry.file_name().as_bytes().starts_with(b".")
        });

    let mut entries = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => entries.push(entry.into_path()),
            Err(e) if flags.ignore_errors => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable entry in subtree");
            }
            Err(e) => return Err(walk_error(e)),
        }
    }

    entries.sort();
    Ok(entries)
}

fn compile(pattern: &str, glob: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|source| FsError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Hidden names pass only with `include_dot_files` or when the pattern
/// component at that depth asks for a leading dot explicitly.
fn dot_entry_allowed(entry: &DirEntry, remainder: &[String], flags: GlobFlags) -> bool {
    if flags.include_dot_files || entry.depth() == 0 {
        return true;
    }
    if !entry.file_name().to_string_lossy().starts_with('.') {
        return true;
    }
    remainder
        .get(entry.depth() - 1)
        .is_some_and(|c| c.starts_with('.'))
}

fn walk_error(err: walkdir::Error) -> FsError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    FsError::io(path, source)
}

fn has_wildcard(component: &str, brace_expand: bool) -> bool {
    let mut chars = component.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '*' | '?' | '[' => return true,
            '{' if brace_expand => return true,
            _ => {}
        }
    }
    false
}

fn unescape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_braces(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
