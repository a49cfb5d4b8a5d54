//! Lock mode definitions.

/// How a lock handle locks its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// Only one holder at a time.
    #[default]
    Exclusive,
    /// Any number of shared holders, excluding exclusive holders.
    Shared,
}

impl LockMode {
    /// The `flock(2)` operation for this mode.
    pub(super) fn operation(self) -> libc::c_int {
        match self {
            LockMode::Exclusive => libc::LOCK_EX,
            LockMode::Shared => libc::LOCK_SH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LockMode::Exclusive => "exclusive",
            LockMode::Shared => "shared",
        }
    }
}
