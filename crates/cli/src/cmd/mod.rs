mod apply;
mod current;
mod diff;
mod edit;
mod profile;
mod recovery;
mod reset;
mod restore;
mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use prefguard_lib::{ApplyResult, EngineConfig, SafeApplyController};

use crate::output::{OutputFormat, print_error, print_json, print_stat, print_success, print_warning};

pub use apply::cmd_apply;
pub use current::cmd_current;
pub use diff::cmd_diff;
pub use edit::{cmd_set, cmd_unset};
pub use profile::cmd_profile;
pub use recovery::cmd_recovery;
pub use reset::cmd_reset;
pub use restore::cmd_restore;
pub use validate::cmd_validate;

/// Whether a command did what was asked. Drives the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Done,
  Rejected,
}

impl From<bool> for Outcome {
  fn from(accepted: bool) -> Self {
    if accepted { Outcome::Done } else { Outcome::Rejected }
  }
}

/// Settings given as global flags, applied over the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub profile_root: Option<PathBuf>,
  pub backup_depth: Option<usize>,
}

pub fn load_engine(overrides: &Overrides) -> Result<SafeApplyController> {
  let mut config = EngineConfig::load().context("Failed to load configuration")?;
  if let Some(root) = &overrides.profile_root {
    config.profile_candidates = Some(vec![root.clone()]);
  }
  if let Some(depth) = overrides.backup_depth {
    config.backup_depth = depth;
  }
  SafeApplyController::from_config(&config).context("Invalid configuration")
}

/// Reads proposed text from a file, or from stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String> {
  if path == Path::new("-") {
    let mut text = String::new();
    std::io::stdin()
      .read_to_string(&mut text)
      .context("Failed to read from stdin")?;
    return Ok(text);
  }
  std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Reports the result of apply, restore, reset, set and unset.
pub fn report(result: &ApplyResult, action: &str, output: OutputFormat) -> Result<Outcome> {
  if output.is_json() {
    print_json(result)?;
    return Ok(result.accepted.into());
  }

  if !result.accepted {
    let reason = result.reason.map(|r| r.to_string()).unwrap_or_default();
    print_error(&format!(
      "{} rejected ({}): {}",
      action,
      reason,
      result.detail.as_deref().unwrap_or("no detail")
    ));
    if let Some(validation) = &result.validation {
      for issue in validation.errors.iter().skip(1) {
        print_error(&format!("line {}: {}", issue.line, issue.message));
      }
    }
    return Ok(Outcome::Rejected);
  }

  print_success(&format!("{} succeeded", action));
  if let Some(path) = &result.target_path {
    print_stat("Target", &path.display().to_string());
  }
  match result.backup_generation_created {
    Some(generation) => print_stat("Backup", &format!("generation {generation}")),
    None => print_stat("Backup", "none"),
  }
  if let Some(detail) = &result.detail {
    print_stat("Detail", detail);
  }
  if let Some(validation) = &result.validation {
    for warning in &validation.warnings {
      print_warning(&format!("line {}: {}", warning.line, warning.message));
    }
  }
  Ok(Outcome::Done)
}
