//! Enumerates what an operator can do to get a working target back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backup::{BackupError, BackupGeneration, BackupStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum RecoveryAction {
  RestoreLatest,
  RestoreGeneration { generation: usize },
  /// Remove `user.js` so the browser falls back to its own defaults.
  DeleteToDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryOptions {
  pub target_path: PathBuf,
  pub target_exists: bool,
  pub has_backups: bool,
  /// Newest first.
  pub generations: Vec<BackupGeneration>,
  pub can_delete_to_defaults: bool,
  pub actions: Vec<RecoveryAction>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryAdvisor {
  backups: BackupStore,
}

impl RecoveryAdvisor {
  pub fn new(backups: BackupStore) -> Self {
    Self { backups }
  }

  /// Reads the backup history of `target`. Never mutates anything.
  pub fn options(&self, target: &Path) -> Result<RecoveryOptions, BackupError> {
    let generations = self.backups.list(target)?;
    let target_exists = target.is_file();

    let mut actions = Vec::new();
    if let Some(newest) = generations.first() {
      actions.push(if newest.index == 1 {
        RecoveryAction::RestoreLatest
      } else {
        RecoveryAction::RestoreGeneration {
          generation: newest.index,
        }
      });
    }
    actions.extend(
      generations
        .iter()
        .skip(1)
        .map(|g| RecoveryAction::RestoreGeneration { generation: g.index }),
    );
    if target_exists {
      actions.push(RecoveryAction::DeleteToDefaults);
    }

    Ok(RecoveryOptions {
      target_path: target.to_path_buf(),
      target_exists,
      has_backups: !generations.is_empty(),
      generations,
      can_delete_to_defaults: target_exists,
      actions,
    })
  }
}
