//! Default value functions used by the Config struct.

/// Permissions for newly created lock and counter files (`rw-rw-r--`).
pub const DEFAULT_FILE_MODE: u32 = 0o664;

pub fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}
