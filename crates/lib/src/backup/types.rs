use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One numbered snapshot of a target file. Index 1 is the newest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupGeneration {
  pub index: usize,
  pub path: PathBuf,
  pub size_bytes: u64,
  /// Modification time in seconds since the Unix epoch, when available.
  pub modified_unix: Option<u64>,
}

#[derive(Debug, Error)]
pub enum BackupError {
  #[error("target path has no file name: {0}")]
  InvalidTarget(PathBuf),

  #[error("backup slot {0} is occupied by something other than a file")]
  SlotOccupied(PathBuf),

  #[error("failed to list backups in {path}: {source}")]
  List {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to discard old backup {path}: {source}")]
  Discard {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to rotate backup {from} -> {to}: {source}")]
  Rotate {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write backup {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}
