use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TARGET_FILENAME;

/// Which index entry designated the active profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultSource {
  /// `Default=` of an `[Install…]` section.
  Install,
  /// `Default=1` of a `[Profile…]` section.
  ProfileFlag,
}

/// The active profile as resolved from a `profiles.ini` index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLocation {
  /// Directory containing `profiles.ini`.
  pub base_directory: PathBuf,
  /// `Path=` value exactly as written in the index.
  pub profile_relative_path: String,
  pub resolved_absolute_path: PathBuf,
  pub source: DefaultSource,
  pub is_relative: bool,
  pub profile_name: Option<String>,
}

impl ProfileLocation {
  /// The `user.js` inside the profile directory.
  pub fn target_path(&self) -> PathBuf {
    self.resolved_absolute_path.join(TARGET_FILENAME)
  }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
  #[error("no browser installation found (searched: {})", display_paths(.searched))]
  NoInstallation { searched: Vec<PathBuf> },

  #[error("{index} does not name a default profile")]
  NoDefaultProfile { index: PathBuf },

  #[error("default profile directory does not exist: {path}")]
  ProfileDirectoryMissing { path: PathBuf },

  #[error("failed to read {path}: {source}")]
  IndexUnreadable {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

fn display_paths(paths: &[PathBuf]) -> String {
  if paths.is_empty() {
    return "no candidate directories".to_string();
  }
  paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
