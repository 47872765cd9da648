use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::apply::RejectReason;
use crate::backup::BackupError;
use crate::config::ConfigError;
use crate::platform::ProbeError;
use crate::profile::ResolutionError;
use crate::target_lock::TargetLockError;
use crate::validate::ValidationResult;

#[derive(Debug, Error)]
pub enum GuardError {
  #[error("the browser is running; close it and try again")]
  ApplicationRunning,

  #[error("could not determine whether the browser is running: {0}")]
  ProbeFailed(#[from] ProbeError),
}

#[derive(Debug, Error)]
#[error("{}", .result.error_detail.as_deref().unwrap_or("proposed configuration is invalid"))]
pub struct ValidationError {
  pub result: ValidationResult,
}

#[derive(Debug, Error)]
pub enum StorageError {
  #[error(transparent)]
  Backup(#[from] BackupError),

  #[error(transparent)]
  Lock(#[from] TargetLockError),

  #[error("backup generation {generation} does not exist for {target}")]
  BackupNotFound { generation: usize, target: PathBuf },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{path} is not valid UTF-8 and cannot be edited in place")]
  NotUtf8 { path: PathBuf },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Error)]
pub enum EngineError {
  #[error(transparent)]
  Resolution(#[from] ResolutionError),

  #[error(transparent)]
  Guard(#[from] GuardError),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Storage(#[from] StorageError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl EngineError {
  /// The rejection reason reported when this error stops an operation.
  pub fn reject_reason(&self) -> RejectReason {
    match self {
      EngineError::Resolution(_) => RejectReason::ProfileUnresolved,
      EngineError::Guard(GuardError::ApplicationRunning) => RejectReason::ApplicationRunning,
      EngineError::Validation(_) => RejectReason::ValidationFailed,
      EngineError::Storage(StorageError::BackupNotFound { .. }) => RejectReason::BackupNotFound,
      EngineError::Guard(GuardError::ProbeFailed(_)) | EngineError::Storage(_) | EngineError::Config(_) => {
        RejectReason::StorageFailed
      }
    }
  }
}

impl From<BackupError> for EngineError {
  fn from(err: BackupError) -> Self {
    EngineError::Storage(StorageError::Backup(err))
  }
}

impl From<TargetLockError> for EngineError {
  fn from(err: TargetLockError) -> Self {
    EngineError::Storage(StorageError::Lock(err))
  }
}

impl From<ProbeError> for EngineError {
  fn from(err: ProbeError) -> Self {
    EngineError::Guard(GuardError::ProbeFailed(err))
  }
}
