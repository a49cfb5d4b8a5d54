use nix::sys::stat::Mode;
use nix::unistd;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};

/// Create files and directories under `root`.
///
/// Entries ending in `/` are directories; everything else is a file whose
/// content is its own name. Parents are created as needed.
pub(crate) fn build_tree(root: &Path, entries: &[&str]) {
    for entry in entries {
        let path = root.join(entry.trim_end_matches('/'));
        if entry.ends_with('/') {
            std::fs::create_dir_all(&path).unwrap();
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, entry).unwrap();
        }
    }
}

pub(crate) fn make_fifo(path: &Path) {
    unistd::mkfifo(path, Mode::from_bits_truncate(0o644))
        .unwrap_or_else(|e| panic!("mkfifo {} failed: {}", path.display(), e));
}

/// Bind a Unix socket at `path`. Keep the listener alive while the node is needed.
pub(crate) fn make_socket(path: &Path) -> UnixListener {
    UnixListener::bind(path).unwrap_or_else(|e| panic!("bind {}: {}", path.display(), e))
}

/// Paths in `found`, made relative to `root` and rendered as strings.
pub(crate) fn relative_names(root: &Path, found: &[PathBuf]) -> Vec<String> {
    found
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or(p)
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}
