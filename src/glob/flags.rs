//! Glob expansion flags.

use serde::{Deserialize, Serialize};

/// Options controlling how a pattern is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobFlags {
    /// Skip unreadable directories instead of failing.
    pub ignore_errors: bool,
    /// Treat `{a,b}` as alternation; otherwise braces are literal.
    pub brace_expand: bool,
    /// Let wildcards match names starting with `.`.
    pub include_dot_files: bool,
    /// Replace a leading `~` with `$HOME`.
    pub tilde_expand: bool,
    /// Let `**` descend into subdirectories; otherwise it behaves like `*`.
    pub recursive: bool,
    /// Return an empty list when nothing matches instead of `NoMatch`.
    pub allow_empty: bool,
}

impl Default for GlobFlags {
    fn default() -> Self {
        Self {
            ignore_errors: true,
            brace_expand: true,
            include_dot_files: true,
            tilde_expand: true,
            recursive: true,
            allow_empty: true,
        }
    }
}

impl GlobFlags {
    /// Flags with every option off.
    pub fn none() -> Self {
        Self {
            ignore_errors: false,
            brace_expand: false,
            include_dot_files: false,
            tilde_expand: false,
            recursive: false,
            allow_empty: false,
        }
    }
}
