//! Engine configuration.
//!
//! Layers, lowest precedence first: built-in defaults, the JSON config file,
//! then `PREFGUARD_*` environment variables. Callers such as the CLI apply
//! their own flags on top of the loaded value.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_BACKUP_DEPTH, ENV_BACKUP_DEPTH, ENV_CONFIG, ENV_PROCESS_NAMES, ENV_PROFILE_ROOT};
use crate::platform::paths::{config_file, default_profile_roots};
use crate::platform::process::DEFAULT_PROCESS_NAMES;
use crate::validate::{Catalog, DenyRule, PreferenceRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid value {value:?} for {name}: {reason}")]
  InvalidEnv {
    name: &'static str,
    value: String,
    reason: String,
  },

  #[error("invalid configuration: {0}")]
  Invalid(String),

  #[error(transparent)]
  Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
  /// Backup generations kept per target.
  pub backup_depth: usize,
  /// Browser base directories in priority order. `None` uses the platform defaults.
  pub profile_candidates: Option<Vec<PathBuf>>,
  /// Executable names that count as "browser running".
  pub process_names: Vec<String>,
  /// Replaces the built-in deny list when set.
  pub deny_list: Option<Vec<DenyRule>>,
  /// JSON preference catalog replacing the built-in one.
  pub registry_path: Option<PathBuf>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      backup_depth: DEFAULT_BACKUP_DEPTH,
      profile_candidates: None,
      process_names: DEFAULT_PROCESS_NAMES.iter().map(|s| s.to_string()).collect(),
      deny_list: None,
      registry_path: None,
    }
  }
}

impl EngineConfig {
  /// Loads defaults, the config file and environment overrides.
  ///
  /// A missing file at the default location is not an error; a missing file
  /// named by `PREFGUARD_CONFIG` is.
  pub fn load() -> Result<Self, ConfigError> {
    let explicit = std::env::var_os(ENV_CONFIG).filter(|v| !v.is_empty()).map(PathBuf::from);

    let mut config = match (&explicit, config_file()) {
      (Some(path), _) => {
        if !path.is_file() {
          return Err(ConfigError::NotFound(path.clone()));
        }
        Self::from_file(path)?
      }
      (None, Some(path)) if path.is_file() => Self::from_file(&path)?,
      _ => Self::default(),
    };

    config.apply_env()?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    debug!(path = %path.display(), "loading config file");
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Applies `PREFGUARD_*` overrides from the environment.
  pub fn apply_env(&mut self) -> Result<(), ConfigError> {
    if let Some(value) = env_value(ENV_BACKUP_DEPTH) {
      self.backup_depth = value.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
        name: ENV_BACKUP_DEPTH,
        value: value.clone(),
        reason: e.to_string(),
      })?;
    }

    if let Some(value) = env_value(ENV_PROFILE_ROOT) {
      self.profile_candidates = Some(vec![PathBuf::from(value)]);
    }

    if let Some(value) = env_value(ENV_PROCESS_NAMES) {
      let names: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
      if names.is_empty() {
        return Err(ConfigError::InvalidEnv {
          name: ENV_PROCESS_NAMES,
          value,
          reason: "no process names given".to_string(),
        });
      }
      self.process_names = names;
    }

    Ok(())
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.backup_depth == 0 {
      return Err(ConfigError::Invalid("backup_depth must be at least 1".to_string()));
    }
    if self.process_names.is_empty() {
      return Err(ConfigError::Invalid("process_names must not be empty".to_string()));
    }
    if self.profile_candidates.as_ref().is_some_and(Vec::is_empty) {
      return Err(ConfigError::Invalid("profile_candidates must not be empty".to_string()));
    }
    Ok(())
  }

  pub fn candidates(&self) -> Vec<PathBuf> {
    self.profile_candidates.clone().unwrap_or_else(default_profile_roots)
  }

  pub fn deny_rules(&self) -> Vec<DenyRule> {
    self.deny_list.clone().unwrap_or_else(DenyRule::defaults)
  }

  /// The preference catalog: loaded from `registry_path`, or the built-in one.
  pub fn registry(&self) -> Result<Arc<dyn PreferenceRegistry>, ConfigError> {
    match &self.registry_path {
      Some(path) => Ok(Arc::new(Catalog::from_json_file(path)?)),
      None => Ok(Arc::new(Catalog::builtin())),
    }
  }
}

fn env_value(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
