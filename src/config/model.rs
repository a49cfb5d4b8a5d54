//! Config struct definition and default implementation.

use super::types::default_file_mode;
use crate::glob::GlobFlags;
use crate::remove::SpecialFilePolicy;
use serde::{Deserialize, Serialize};

/// Configuration for fsprims operations.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock and counter settings
    // =========================================================================
    /// Permission bits for lock and counter files created on first use.
    #[serde(default = "default_file_mode")]
    pub lock_file_mode: u32,

    /// Whether to fsync the counter file after every increment.
    #[serde(default)]
    pub counter_sync: bool,

    // =========================================================================
    // Removal settings
    // =========================================================================
    /// Defaults for recursive removal.
    #[serde(default)]
    pub remove: RemoveSettings,

    /// Glob flags used when expanding removal patterns.
    #[serde(default)]
    pub glob: GlobFlags,
}

/// Removal defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RemoveSettings {
    /// What to do with FIFOs, sockets and device nodes.
    pub special_files: SpecialFilePolicy,

    /// Continue past failures and report the first one at the end.
    pub keep_going: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_file_mode: default_file_mode(),
            counter_sync: false,
            remove: RemoveSettings::default(),
            glob: GlobFlags::default(),
        }
    }
}
