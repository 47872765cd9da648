//! Per-target advisory locking.
//!
//! Mutating operations on one `user.js` are serialized through a lock file in
//! the engine's data directory, never through the target itself. The lock file
//! is named after a SHA-256 of the canonical target path, so two spellings of
//! the same path share a lock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::paths::lock_dir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
  pub version: u32,
  pub pid: u32,
  pub started_at_unix: u64,
  pub command: String,
  pub target: PathBuf,
}

#[derive(Debug, Error)]
pub enum TargetLockError {
  #[error("failed to create lock directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to open lock file {path}: {source}")]
  OpenFile {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write lock metadata: {0}")]
  WriteMetadata(#[source] io::Error),

  #[error("failed to acquire lock on {path}: {source}")]
  LockFailed {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Exclusive lock on one target. Released on drop.
#[derive(Debug)]
pub struct TargetLock {
  file: File,
  lock_path: PathBuf,
}

impl TargetLock {
  /// Locks `target` using the default lock directory, waiting for any holder.
  pub fn acquire(target: &Path, command: &str) -> Result<Self, TargetLockError> {
    Self::acquire_in(&lock_dir(), target, command)
  }

  pub fn acquire_in(dir: &Path, target: &Path, command: &str) -> Result<Self, TargetLockError> {
    fs::create_dir_all(dir).map_err(|source| TargetLockError::CreateDir {
      path: dir.to_path_buf(),
      source,
    })?;

    let canonical = canonical_target(target);
    let lock_path = dir.join(lock_file_name(&canonical));

    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(&lock_path)
      .map_err(|source| TargetLockError::OpenFile {
        path: lock_path.clone(),
        source,
      })?;

    match lock(&file, false) {
      Ok(()) => {}
      Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
        match read_holder(&lock_path) {
          Some(holder) => warn!(
            pid = holder.pid,
            command = %holder.command,
            started_at_unix = holder.started_at_unix,
            "target is locked by another prefguard process, waiting"
          ),
          None => warn!(lock = %lock_path.display(), "target is locked, waiting"),
        }
        lock(&file, true).map_err(|source| TargetLockError::LockFailed {
          path: lock_path.clone(),
          source,
        })?;
      }
      Err(source) => {
        return Err(TargetLockError::LockFailed {
          path: lock_path.clone(),
          source,
        });
      }
    }

    write_metadata(&file, command, &canonical)?;
    debug!(target = %canonical.display(), lock = %lock_path.display(), "target lock acquired");

    Ok(Self { file, lock_path })
  }

  pub fn lock_path(&self) -> &Path {
    &self.lock_path
  }

  /// Reads the metadata through the held handle.
  ///
  /// Opening a second handle would fail on Windows, where the byte-range lock
  /// is mandatory.
  pub fn read_metadata(&self) -> io::Result<LockMetadata> {
    let mut file = &self.file;
    file.seek(SeekFrom::Start(0))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    serde_json::from_str(&contents).map_err(io::Error::other)
  }
}

/// Canonicalizes the parent directory so a not-yet-created target still maps
/// to a stable path.
fn canonical_target(target: &Path) -> PathBuf {
  if let Ok(path) = dunce::canonicalize(target) {
    return path;
  }
  match (target.parent(), target.file_name()) {
    (Some(parent), Some(name)) => dunce::canonicalize(parent)
      .map(|p| p.join(name))
      .unwrap_or_else(|_| target.to_path_buf()),
    _ => target.to_path_buf(),
  }
}

fn lock_file_name(canonical: &Path) -> String {
  let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
  format!("{}.lock", hex::encode(digest))
}

fn write_metadata(file: &File, command: &str, target: &Path) -> Result<(), TargetLockError> {
  let metadata = LockMetadata {
    version: 1,
    pid: std::process::id(),
    started_at_unix: SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap_or_default()
      .as_secs(),
    command: command.to_string(),
    target: target.to_path_buf(),
  };

  file.set_len(0).map_err(TargetLockError::WriteMetadata)?;
  let mut writer = io::BufWriter::new(file);
  writer.seek(SeekFrom::Start(0)).map_err(TargetLockError::WriteMetadata)?;
  serde_json::to_writer_pretty(&mut writer, &metadata)
    .map_err(|e| TargetLockError::WriteMetadata(io::Error::other(e)))?;
  writer.flush().map_err(TargetLockError::WriteMetadata)?;
  Ok(())
}

fn read_holder(lock_path: &Path) -> Option<LockMetadata> {
  let contents = fs::read_to_string(lock_path).ok()?;
  serde_json::from_str(&contents).ok()
}

#[cfg(unix)]
fn lock(file: &File, blocking: bool) -> io::Result<()> {
  use rustix::fs::{FlockOperation, flock};
  use std::os::unix::io::AsFd;

  let operation = if blocking {
    FlockOperation::LockExclusive
  } else {
    FlockOperation::NonBlockingLockExclusive
  };

  flock(file.as_fd(), operation).map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(windows)]
fn lock(file: &File, blocking: bool) -> io::Result<()> {
  use std::os::windows::io::AsRawHandle;
  use windows_sys::Win32::Foundation::{ERROR_LOCK_VIOLATION, HANDLE};
  use windows_sys::Win32::Storage::FileSystem::{LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx};

  let handle = file.as_raw_handle() as HANDLE;
  let flags = if blocking {
    LOCKFILE_EXCLUSIVE_LOCK
  } else {
    LOCKFILE_FAIL_IMMEDIATELY | LOCKFILE_EXCLUSIVE_LOCK
  };

  // SAFETY: OVERLAPPED is a plain data struct that is valid when zero-initialized,
  // and the handle is owned by `file` for the duration of the call.
  let result = unsafe {
    let mut overlapped = std::mem::zeroed();
    LockFileEx(handle, flags, 0, 1, 0, &mut overlapped)
  };

  if result != 0 {
    return Ok(());
  }
  let err = io::Error::last_os_error();
  if err.raw_os_error() == Some(ERROR_LOCK_VIOLATION as i32) {
    return Err(io::Error::from(io::ErrorKind::WouldBlock));
  }
  Err(err)
}
