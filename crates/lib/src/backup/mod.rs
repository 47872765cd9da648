//! Rotating backup history for a target file.
//!
//! # Storage Layout
//!
//! Backups live next to the target they protect:
//!
//! ```text
//! <profile>/
//! ├── user.js            # live target
//! ├── user.js.backup.1   # newest
//! ├── …
//! └── user.js.backup.<depth>
//! ```
//!
//! A new snapshot discards the oldest generation, shifts the rest up by one
//! and copies the target into generation 1. The live target is only ever
//! read, so a crash part-way through can lose or duplicate one generation
//! but never the target itself.
//!
//! The copy is staged and every slot is checked before the first rename, so
//! an ordinary failure (unwritable directory, a directory squatting on a
//! slot) leaves the history as it was.

mod types;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{debug, info};

use crate::consts::{BACKUP_INFIX, DEFAULT_BACKUP_DEPTH};
use crate::util::fs::stage;

pub use types::{BackupError, BackupGeneration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupStore {
  depth: usize,
}

impl Default for BackupStore {
  fn default() -> Self {
    Self::new(DEFAULT_BACKUP_DEPTH)
  }
}

impl BackupStore {
  /// Creates a store keeping `depth` generations (at least one).
  pub fn new(depth: usize) -> Self {
    Self { depth: depth.max(1) }
  }

  pub fn depth(&self) -> usize {
    self.depth
  }

  /// Path of generation `index` for `target`.
  pub fn path_for(&self, target: &Path, index: usize) -> Result<PathBuf, BackupError> {
    let name = target
      .file_name()
      .ok_or_else(|| BackupError::InvalidTarget(target.to_path_buf()))?;
    let mut file_name = name.to_os_string();
    file_name.push(format!(".{}.{}", BACKUP_INFIX, index));
    Ok(target.with_file_name(file_name))
  }

  /// Lists existing generations, newest first.
  ///
  /// Generations beyond the configured depth (left over from a larger depth)
  /// are included until the next snapshot discards them.
  pub fn list(&self, target: &Path) -> Result<Vec<BackupGeneration>, BackupError> {
    let name = target
      .file_name()
      .ok_or_else(|| BackupError::InvalidTarget(target.to_path_buf()))?
      .to_string_lossy()
      .into_owned();
    let prefix = format!("{}.{}.", name, BACKUP_INFIX);
    let dir = match target.parent() {
      Some(p) if !p.as_os_str().is_empty() => p,
      _ => Path::new("."),
    };

    let entries = match fs::read_dir(dir) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(source) => {
        return Err(BackupError::List {
          path: dir.to_path_buf(),
          source,
        });
      }
    };

    let mut generations = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|source| BackupError::List {
        path: dir.to_path_buf(),
        source,
      })?;
      let file_name = entry.file_name();
      let Some(index) = file_name
        .to_str()
        .and_then(|n| n.strip_prefix(&prefix))
        .and_then(|suffix| suffix.parse::<usize>().ok())
        .filter(|&i| i >= 1)
      else {
        continue;
      };
      let Ok(metadata) = entry.metadata() else {
        continue;
      };
      if !metadata.is_file() {
        continue;
      }
      generations.push(BackupGeneration {
        index,
        path: entry.path(),
        size_bytes: metadata.len(),
        modified_unix: modified_secs(&metadata),
      });
    }

    generations.sort_by_key(|g| g.index);
    Ok(generations)
  }

  /// Reads the contents of generation `index`, or `None` if it does not exist.
  pub fn read(&self, target: &Path, index: usize) -> Result<Option<Vec<u8>>, BackupError> {
    let path = self.path_for(target, index)?;
    match fs::read(&path) {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(BackupError::Read { path, source }),
    }
  }

  /// Bytes of generation `index` exactly as stored, for writing back over
  /// the target.
  pub fn restore(&self, target: &Path, index: usize) -> Result<Option<Vec<u8>>, BackupError> {
    self.read(target, index)
  }

  /// Copies the current target into generation 1, rotating older generations.
  ///
  /// Returns `None` without touching the history when the target does not
  /// exist yet.
  pub fn snapshot(&self, target: &Path) -> Result<Option<BackupGeneration>, BackupError> {
    let contents = match fs::read(target) {
      Ok(contents) => contents,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(target = %target.display(), "target does not exist, nothing to back up");
        return Ok(None);
      }
      Err(source) => {
        return Err(BackupError::Read {
          path: target.to_path_buf(),
          source,
        });
      }
    };

    for index in 1..=self.depth {
      let slot = self.path_for(target, index)?;
      if fs::symlink_metadata(&slot).is_ok_and(|m| !m.is_file()) {
        return Err(BackupError::SlotOccupied(slot));
      }
    }

    let path = self.path_for(target, 1)?;
    let staged = stage(&path, &contents).map_err(|source| BackupError::Write {
      path: path.clone(),
      source,
    })?;

    self.rotate(target)?;

    staged.persist(&path).map_err(|e| BackupError::Write {
      path: path.clone(),
      source: e.error,
    })?;

    info!(target = %target.display(), backup = %path.display(), "backup generation 1 written");

    let modified_unix = fs::metadata(&path).ok().and_then(|m| modified_secs(&m));
    Ok(Some(BackupGeneration {
      index: 1,
      path,
      size_bytes: contents.len() as u64,
      modified_unix,
    }))
  }

  /// Drops generations that would exceed the depth after a shift, then moves
  /// every remaining generation up by one, oldest first.
  fn rotate(&self, target: &Path) -> Result<(), BackupError> {
    for generation in self.list(target)?.into_iter().filter(|g| g.index >= self.depth) {
      debug!(path = %generation.path.display(), "discarding backup generation {}", generation.index);
      fs::remove_file(&generation.path).map_err(|source| BackupError::Discard {
        path: generation.path.clone(),
        source,
      })?;
    }

    for index in (1..self.depth).rev() {
      let from = self.path_for(target, index)?;
      if !from.is_file() {
        continue;
      }
      let to = self.path_for(target, index + 1)?;
      fs::rename(&from, &to).map_err(|source| BackupError::Rotate {
        from: from.clone(),
        to: to.clone(),
        source,
      })?;
    }

    Ok(())
  }
}

fn modified_secs(metadata: &fs::Metadata) -> Option<u64> {
  metadata
    .modified()
    .ok()
    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
    .map(|d| d.as_secs())
}
