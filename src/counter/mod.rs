//! Persistent unique counters.
//!
//! A counter file holds up to [`MAX_SLOTS`] independent 128-bit counters.
//! Slot `i` lives at byte offset `i * SLOT_SIZE` as a native-endian `u128`.
//! There is no header; unwritten slots read as zero, and the file may be
//! sparse.
//!
//! Every increment runs under an exclusive `flock` on the whole file, so
//! concurrent callers in any number of processes never observe the same
//! value for a given (file, slot) pair.


use crate::config::Config;
use crate::config::types::DEFAULT_FILE_MODE;
use crate::error::{FsError, Result};
use crate::locks::{LockHandle, LockMode};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Size of one counter slot in bytes.
pub const SLOT_SIZE: u64 = 16;

/// Number of addressable slots per counter file.
pub const MAX_SLOTS: i64 = 65536;

/// A counter file on disk.
#[derive(Debug, Clone)]
pub struct CounterFile {
    path: PathBuf,
    permissions: u32,
    sync: bool,
}

impl CounterFile {
    /// Describe the counter file at `path`. Nothing is opened until a slot is used.
    ///
    /// # Errors
    ///
    /// * `FsError::PathMissing` - `path` is empty
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FsError::PathMissing);
        }

        Ok(Self {
            path: path.to_path_buf(),
            permissions: DEFAULT_FILE_MODE,
            sync: false,
        })
    }

    /// Like [`new`](Self::new), taking file permissions and fsync behavior from `config`.
    pub fn with_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let mut counter = Self::new(path)?;
        counter.permissions = config.lock_file_mode;
        counter.sync = config.counter_sync;
        Ok(counter)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Increment slot `index` and return the new value.
    ///
    /// The first call on a fresh slot returns 1.
    ///
    /// # Errors
    ///
    /// * `FsError::OutOfRange` - `index` is not in `0..MAX_SLOTS` (no I/O is done)
    /// * `FsError::File` - the counter file could not be opened or created
    /// * `FsError::Lock` - the exclusive lock could not be taken
    /// * `FsError::Io` - seek, read or write failed
    /// * `FsError::CounterOverflow` - the slot already holds `u128::MAX`
    pub fn next(&self, index: i64) -> Result<u128> {
        let offset = slot_offset(index)?;

        let handle = self.open(LockMode::Exclusive)?;
        let guard = handle.scoped()?;
        let mut file = guard.file();

        let current = read_slot(&mut file, offset).map_err(|e| self.io_error(e))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| FsError::CounterOverflow {
                path: self.path.clone(),
                index,
            })?;

        write_slot(&mut file, offset, next).map_err(|e| self.io_error(e))?;
        if self.sync {
            file.sync_data().map_err(|e| self.io_error(e))?;
        }

        debug!(path = %self.path.display(), index, value = %next, "counter incremented");
        Ok(next)
    }

    /// Read slot `index` under a shared lock without changing it.
    ///
    /// A slot that was never written reads as 0.
    pub fn current(&self, index: i64) -> Result<u128> {
        let offset = slot_offset(index)?;

        let handle = self.open(LockMode::Shared)?;
        let guard = handle.scoped()?;
        let mut file = guard.file();

        read_slot(&mut file, offset).map_err(|e| self.io_error(e))
    }

    fn open(&self, mode: LockMode) -> Result<LockHandle> {
        LockHandle::open_or_create_with_permissions(&self.path, mode, self.permissions)
    }

    fn io_error(&self, source: io::Error) -> FsError {
        FsError::io(&self.path, source)
    }
}

/// Increment slot `index` of the counter file at `counter_path`.
///
/// See [`CounterFile::next`].
pub fn next_value<P: AsRef<Path>>(counter_path: P, index: i64) -> Result<u128> {
    CounterFile::new(counter_path)?.next(index)
}

fn slot_offset(index: i64) -> Result<u64> {
    if !(0..MAX_SLOTS).contains(&index) {
        return Err(FsError::OutOfRange {
            index,
            limit: MAX_SLOTS,
        });
    }
    Ok(index as u64 * SLOT_SIZE)
}

/// Read the slot at `offset`; a slot past end of file (or cut short by it) is 0.
fn read_slot(file: &mut &File, offset: u64) -> io::Result<u128> {
    file.seek(SeekFrom::Start(offset))?;

    let mut buf = [0u8; SLOT_SIZE as usize];
    match file.read_exact(&mut buf) {
        Ok(()) => Ok(u128::from_ne_bytes(buf)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
        Err(e) => Err(e),
    }
}

fn write_slot(file: &mut &File, offset: u64, value: u128) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(&value.to_ne_bytes())
}
