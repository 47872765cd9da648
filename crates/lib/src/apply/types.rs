use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffHunk, DiffSummary};
use crate::validate::ValidationResult;

/// Why an operation left the target untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
  ProfileUnresolved,
  ApplicationRunning,
  ValidationFailed,
  StorageFailed,
  BackupNotFound,
}

impl RejectReason {
  pub fn as_str(&self) -> &'static str {
    match self {
      RejectReason::ProfileUnresolved => "profile-unresolved",
      RejectReason::ApplicationRunning => "application-running",
      RejectReason::ValidationFailed => "validation-failed",
      RejectReason::StorageFailed => "storage-failed",
      RejectReason::BackupNotFound => "backup-not-found",
    }
  }
}

impl fmt::Display for RejectReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
  /// Write without snapshotting the current file first.
  pub skip_backup: bool,
}

/// Outcome of apply, restore and reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyResult {
  pub accepted: bool,
  pub reason: Option<RejectReason>,
  pub detail: Option<String>,
  /// Index of the generation written before the change (always 1), if any.
  pub backup_generation_created: Option<usize>,
  /// `None` only when the profile could not be resolved.
  pub target_path: Option<PathBuf>,
  pub validation: Option<ValidationResult>,
}

impl ApplyResult {
  pub(crate) fn accepted(target: PathBuf, backup_generation_created: Option<usize>) -> Self {
    Self {
      accepted: true,
      reason: None,
      detail: None,
      backup_generation_created,
      target_path: Some(target),
      validation: None,
    }
  }

  pub(crate) fn rejected(reason: RejectReason, detail: String, target_path: Option<PathBuf>) -> Self {
    Self {
      accepted: false,
      reason: Some(reason),
      detail: Some(detail),
      backup_generation_created: None,
      target_path,
      validation: None,
    }
  }

  pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }

  pub(crate) fn with_validation(mut self, validation: ValidationResult) -> Self {
    self.validation = Some(validation);
    self
  }
}

/// The on-disk state of the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum CurrentConfig {
  Existing {
    path: PathBuf,
    text: String,
    statement_count: usize,
    key_count: usize,
    malformed_lines: Vec<usize>,
  },
  /// No `user.js` yet; `template` is a starting point built from the catalog.
  NotCreated { path: PathBuf, template: String },
}

impl CurrentConfig {
  pub fn path(&self) -> &PathBuf {
    match self {
      CurrentConfig::Existing { path, .. } | CurrentConfig::NotCreated { path, .. } => path,
    }
  }

  /// Text the target holds now; empty when it does not exist.
  pub fn text(&self) -> &str {
    match self {
      CurrentConfig::Existing { text, .. } => text,
      CurrentConfig::NotCreated { .. } => "",
    }
  }
}

/// A diff of proposed text against the current target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPreview {
  pub target_path: PathBuf,
  pub target_exists: bool,
  pub summary: DiffSummary,
  pub hunks: Vec<DiffHunk>,
}
