//! Guarded writes to the active profile's `user.js`.
//!
//! Every mutating operation runs the same sequence:
//!
//! 1. Resolve the active profile
//! 2. Lock the target path
//! 3. Check that the browser is not running
//! 4. Validate the proposed text (apply and edit)
//! 5. Snapshot the current file into the backup history
//! 6. Write the new content atomically (or remove it, for reset)
//!
//! A failure at any step rejects the request and leaves the target and its
//! history exactly as they were. Stage failures come back as a rejected
//! [`ApplyResult`]; `Err` is reserved for failures around the sequence
//! (lock acquisition).

mod types;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backup::BackupStore;
use crate::config::{ConfigError, EngineConfig};
use crate::diff::{DiffSummary, diff};
use crate::document::{ConfigDocument, Directive, PrefStatement};
use crate::error::{EngineError, GuardError, StorageError, ValidationError};
use crate::platform::paths::lock_dir;
use crate::platform::{ProcessProbe, SystemProcessProbe};
use crate::profile::{ProfileLocation, ProfileResolver, ResolutionError};
use crate::recovery::{RecoveryAdvisor, RecoveryOptions};
use crate::target_lock::TargetLock;
use crate::util::fs::write_atomic;
use crate::validate::{ConfigValidator, PreferenceRegistry, ValidationResult};

pub use types::{ApplyOptions, ApplyResult, CurrentConfig, DiffPreview, RejectReason};

#[derive(Clone)]
pub struct SafeApplyController {
  resolver: ProfileResolver,
  probe: Arc<dyn ProcessProbe>,
  validator: ConfigValidator,
  backups: BackupStore,
  lock_dir: PathBuf,
}

impl std::fmt::Debug for SafeApplyController {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SafeApplyController")
      .field("resolver", &self.resolver)
      .field("validator", &self.validator)
      .field("backups", &self.backups)
      .field("lock_dir", &self.lock_dir)
      .finish_non_exhaustive()
  }
}

impl SafeApplyController {
  pub fn new(
    resolver: ProfileResolver,
    probe: Arc<dyn ProcessProbe>,
    validator: ConfigValidator,
    backups: BackupStore,
  ) -> Self {
    Self {
      resolver,
      probe,
      validator,
      backups,
      lock_dir: lock_dir(),
    }
  }

  /// Builds a controller with the system process probe and the configured
  /// candidates, deny list, catalog and depth.
  pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    let validator = ConfigValidator::new(config.deny_rules(), config.registry()?);
    Ok(Self::new(
      ProfileResolver::new(config.candidates()),
      Arc::new(SystemProcessProbe::new(config.process_names.iter().cloned())),
      validator,
      BackupStore::new(config.backup_depth),
    ))
  }

  /// Keeps lock files in `dir` instead of the data directory.
  pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.lock_dir = dir.into();
    self
  }

  pub fn validator(&self) -> &ConfigValidator {
    &self.validator
  }

  pub fn backups(&self) -> &BackupStore {
    &self.backups
  }

  pub fn resolve(&self) -> Result<ProfileLocation, ResolutionError> {
    self.resolver.resolve()
  }

  /// The target as it is on disk, or a template when it does not exist yet.
  pub fn current(&self) -> Result<CurrentConfig, EngineError> {
    let path = self.resolve()?.target_path();
    match read_target(&path)? {
      Some(bytes) => {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let doc = ConfigDocument::parse(&text);
        Ok(CurrentConfig::Existing {
          statement_count: doc.statement_count(),
          key_count: doc.len(),
          malformed_lines: doc.malformed().map(|(line, _)| line.number).collect(),
          path,
          text,
        })
      }
      None => Ok(CurrentConfig::NotCreated {
        template: starter_template(self.validator.registry()),
        path,
      }),
    }
  }

  /// Validates `text` without touching the filesystem.
  pub fn validate(&self, text: &str) -> ValidationResult {
    self.validator.validate(text)
  }

  /// Diffs `proposed` against the current target (empty when absent).
  pub fn diff(&self, proposed: &str) -> Result<DiffPreview, EngineError> {
    let target_path = self.resolve()?.target_path();
    let current = read_target(&target_path)?.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    let hunks = diff(current.as_deref().unwrap_or_default(), proposed);
    Ok(DiffPreview {
      target_exists: current.is_some(),
      summary: DiffSummary::of(&hunks),
      hunks,
      target_path,
    })
  }

  /// Replaces the target with `proposed`.
  pub fn apply(&self, proposed: &str, options: ApplyOptions) -> Result<ApplyResult, EngineError> {
    let target = match self.resolve() {
      Ok(location) => location.target_path(),
      Err(err) => return Ok(rejected("apply", None, err.into())),
    };
    let _lock = TargetLock::acquire_in(&self.lock_dir, &target, "apply")?;

    let outcome = (|| -> Result<(Option<usize>, ValidationResult), EngineError> {
      self.guard()?;
      self.commit(&target, proposed, options)
    })();

    match outcome {
      Ok((backup, validation)) => {
        info!(
          target = %target.display(),
          statements = validation.statement_count,
          backup = ?backup,
          "applied preferences"
        );
        Ok(ApplyResult::accepted(target, backup).with_validation(validation))
      }
      Err(err) => Ok(rejected("apply", Some(target), err)),
    }
  }

  /// Writes backup generation `generation` (default 1) back over the target.
  ///
  /// Backup content is not re-validated. The content being replaced is
  /// snapshotted first, so a restore can itself be undone.
  pub fn restore(&self, generation: Option<usize>) -> Result<ApplyResult, EngineError> {
    let generation = generation.unwrap_or(1);
    let target = match self.resolve() {
      Ok(location) => location.target_path(),
      Err(err) => return Ok(rejected("restore", None, err.into())),
    };
    let _lock = TargetLock::acquire_in(&self.lock_dir, &target, "restore")?;

    let outcome = (|| -> Result<Option<usize>, EngineError> {
      self.guard()?;

      let content = self
        .backups
        .restore(&target, generation)?
        .ok_or_else(|| StorageError::BackupNotFound {
          generation,
          target: target.clone(),
        })?;

      let backup = self.backups.snapshot(&target)?;
      write_target(&target, &content)?;
      Ok(backup.map(|g| g.index))
    })();

    match outcome {
      Ok(backup) => {
        info!(target = %target.display(), generation, "restored backup generation");
        Ok(ApplyResult::accepted(target, backup).with_detail(format!("restored backup generation {generation}")))
      }
      Err(err) => Ok(rejected("restore", Some(target), err)),
    }
  }

  /// Reads the current document, lets `change` modify it and writes the
  /// result, all while holding the target lock.
  ///
  /// `change` returns whether it modified the document; when it did not, the
  /// target is left alone and the request is accepted without a write. A
  /// target that is not valid UTF-8 is rejected rather than re-encoded.
  pub fn edit<F>(&self, operation: &str, change: F) -> Result<ApplyResult, EngineError>
  where
    F: FnOnce(&mut ConfigDocument) -> bool,
  {
    let target = match self.resolve() {
      Ok(location) => location.target_path(),
      Err(err) => return Ok(rejected(operation, None, err.into())),
    };
    let _lock = TargetLock::acquire_in(&self.lock_dir, &target, operation)?;

    let outcome = (|| -> Result<Option<(Option<usize>, ValidationResult)>, EngineError> {
      self.guard()?;

      let text = match read_target(&target)? {
        Some(bytes) => String::from_utf8(bytes).map_err(|_| StorageError::NotUtf8 { path: target.clone() })?,
        None => String::new(),
      };
      let mut doc = ConfigDocument::parse(&text);
      if !change(&mut doc) {
        return Ok(None);
      }

      self.commit(&target, &doc.render(), ApplyOptions::default()).map(Some)
    })();

    match outcome {
      Ok(Some((backup, validation))) => {
        info!(target = %target.display(), operation, backup = ?backup, "edited preferences");
        Ok(ApplyResult::accepted(target, backup).with_validation(validation))
      }
      Ok(None) => {
        debug!(target = %target.display(), operation, "edit left the document unchanged");
        Ok(ApplyResult::accepted(target, None).with_detail("nothing to change"))
      }
      Err(err) => Ok(rejected(operation, Some(target), err)),
    }
  }

  /// Deletes the target so the browser falls back to its defaults, keeping
  /// the removed content in the backup history.
  pub fn reset(&self) -> Result<ApplyResult, EngineError> {
    let target = match self.resolve() {
      Ok(location) => location.target_path(),
      Err(err) => return Ok(rejected("reset", None, err.into())),
    };
    let _lock = TargetLock::acquire_in(&self.lock_dir, &target, "reset")?;

    // a missing target yields no backup and there is nothing to remove
    let outcome = (|| -> Result<Option<usize>, EngineError> {
      self.guard()?;

      let Some(backup) = self.backups.snapshot(&target)? else {
        return Ok(None);
      };
      match fs::remove_file(&target) {
        Ok(()) => Ok(Some(backup.index)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Some(backup.index)),
        Err(source) => Err(
          StorageError::Remove {
            path: target.clone(),
            source,
          }
          .into(),
        ),
      }
    })();

    match outcome {
      Ok(Some(backup)) => {
        info!(target = %target.display(), backup, "removed user.js, browser defaults apply");
        Ok(ApplyResult::accepted(target, Some(backup)).with_detail("removed user.js"))
      }
      Ok(None) => {
        debug!(target = %target.display(), "nothing to reset");
        Ok(ApplyResult::accepted(target, None).with_detail("user.js does not exist, nothing to remove"))
      }
      Err(err) => Ok(rejected("reset", Some(target), err)),
    }
  }

  pub fn recovery_options(&self) -> Result<RecoveryOptions, EngineError> {
    let target = self.resolve()?.target_path();
    Ok(RecoveryAdvisor::new(self.backups).options(&target)?)
  }

  /// Validates, snapshots and writes `proposed`. The caller holds the lock
  /// and has passed the guard.
  fn commit(
    &self,
    target: &Path,
    proposed: &str,
    options: ApplyOptions,
  ) -> Result<(Option<usize>, ValidationResult), EngineError> {
    let validation = self.validator.validate(proposed);
    if !validation.valid {
      return Err(ValidationError { result: validation }.into());
    }

    let backup = if options.skip_backup {
      debug!(target = %target.display(), "skipping backup");
      None
    } else {
      self.backups.snapshot(target)?
    };

    write_target(target, proposed.as_bytes())?;
    Ok((backup.map(|g| g.index), validation))
  }

  fn guard(&self) -> Result<(), GuardError> {
    if self.probe.is_running()? {
      return Err(GuardError::ApplicationRunning);
    }
    Ok(())
  }
}

fn rejected(operation: &str, target: Option<PathBuf>, err: EngineError) -> ApplyResult {
  let reason = err.reject_reason();
  warn!(operation, reason = %reason, error = %err, "request rejected");

  let result = ApplyResult::rejected(reason, err.to_string(), target);
  match err {
    EngineError::Validation(ValidationError { result: validation }) => result.with_validation(validation),
    _ => result,
  }
}

fn read_target(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
  match fs::read(path) {
    Ok(bytes) => Ok(Some(bytes)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(source) => Err(StorageError::Read {
      path: path.to_path_buf(),
      source,
    }),
  }
}

fn write_target(path: &Path, content: &[u8]) -> Result<(), StorageError> {
  write_atomic(path, content).map_err(|source| StorageError::Write {
    path: path.to_path_buf(),
    source,
  })
}

/// A commented `user.js` listing every catalog preference at its recommended value.
fn starter_template(registry: &dyn PreferenceRegistry) -> String {
  let mut out = String::from("// user.js: preferences applied on every browser start\n");
  let mut category: Option<&str> = None;
  for entry in registry.entries() {
    if category != Some(entry.category.as_str()) {
      out.push_str(&format!("\n// {}\n", entry.category));
      category = Some(entry.category.as_str());
    }
    out.push_str(&format!("// {}\n", entry.description));
    out.push_str(&PrefStatement::render(Directive::UserPref, &entry.key, &entry.expected));
    out.push('\n');
  }
  out
}
