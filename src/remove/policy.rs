//! Entry classification and the special-file policy.

use serde::{Deserialize, Serialize};
use std::fs::FileType;
use std::os::unix::fs::FileTypeExt;

/// What the remover does with FIFOs, sockets and device nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFilePolicy {
    /// Refuse to remove them (default, safest).
    #[default]
    Error,
    /// Leave them and their ancestors in place.
    Ignore,
    /// Remove FIFOs and sockets; keep device nodes and their ancestors.
    KeepDevices,
    /// Remove everything.
    RemoveAll,
}

impl SpecialFilePolicy {
    /// Parse a policy from its config spelling.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Self::Error),
            "ignore" => Some(Self::Ignore),
            "keep_devices" => Some(Self::KeepDevices),
            "remove_all" => Some(Self::RemoveAll),
            _ => None,
        }
    }

    /// Decide what happens to an entry of the given kind.
    ///
    /// Unknown kinds are not covered by any policy; callers abort on them.
    pub fn disposition(self, kind: EntryKind) -> Disposition {
        if !kind.is_special() {
            return Disposition::Remove;
        }

        match (self, kind.is_device()) {
            (SpecialFilePolicy::Error, _) => Disposition::Deny,
            (SpecialFilePolicy::Ignore, _) => Disposition::Preserve,
            (SpecialFilePolicy::KeepDevices, true) => Disposition::Preserve,
            (SpecialFilePolicy::KeepDevices, false) => Disposition::Remove,
            (SpecialFilePolicy::RemoveAll, _) => Disposition::Remove,
        }
    }
}

/// Outcome of applying a policy to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Remove,
    Preserve,
    Deny,
}

/// File type of a worklist entry, from `lstat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Regular,
    Symlink,
    Directory,
    Fifo,
    Socket,
    BlockDevice,
    CharDevice,
    Unknown,
}

impl EntryKind {
    pub fn of(file_type: FileType) -> Self {
        if file_type.is_file() {
            EntryKind::Regular
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_fifo() {
            EntryKind::Fifo
        } else if file_type.is_socket() {
            EntryKind::Socket
        } else if file_type.is_block_device() {
            EntryKind::BlockDevice
        } else if file_type.is_char_device() {
            EntryKind::CharDevice
        } else {
            EntryKind::Unknown
        }
    }

    /// FIFOs, sockets and device nodes.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            EntryKind::Fifo | EntryKind::Socket | EntryKind::BlockDevice | EntryKind::CharDevice
        )
    }

    pub fn is_device(self) -> bool {
        matches!(self, EntryKind::BlockDevice | EntryKind::CharDevice)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Regular => "regular",
            EntryKind::Symlink => "symlink",
            EntryKind::Directory => "directory",
            EntryKind::Fifo => "fifo",
            EntryKind::Socket => "socket",
            EntryKind::BlockDevice => "block-device",
            EntryKind::CharDevice => "char-device",
            EntryKind::Unknown => "unknown",
        }
    }
}
