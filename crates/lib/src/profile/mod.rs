//! Locates the active browser profile.
//!
//! Candidate base directories are scanned in priority order for a
//! `profiles.ini`. Resolution reads the index on every call and never guesses:
//! an index without an explicit default is an error.

mod index;
mod types;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::INDEX_FILENAME;
use crate::platform::paths::default_profile_roots;

pub use index::{DefaultEntry, ProfilesIndex, Section};
pub use types::{DefaultSource, ProfileLocation, ResolutionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResolver {
  candidates: Vec<PathBuf>,
}

impl Default for ProfileResolver {
  fn default() -> Self {
    Self::new(default_profile_roots())
  }
}

impl ProfileResolver {
  /// Creates a resolver over base directories in priority order.
  pub fn new(candidates: Vec<PathBuf>) -> Self {
    Self { candidates }
  }

  pub fn candidates(&self) -> &[PathBuf] {
    &self.candidates
  }

  /// First candidate directory holding an index file.
  pub fn installation(&self) -> Option<&Path> {
    self
      .candidates
      .iter()
      .map(PathBuf::as_path)
      .find(|dir| dir.join(INDEX_FILENAME).is_file())
  }

  pub fn resolve(&self) -> Result<ProfileLocation, ResolutionError> {
    let base = self.installation().ok_or_else(|| ResolutionError::NoInstallation {
      searched: self.candidates.clone(),
    })?;
    let index_path = base.join(INDEX_FILENAME);
    debug!(index = %index_path.display(), "reading profile index");

    let text = fs::read_to_string(&index_path).map_err(|source| ResolutionError::IndexUnreadable {
      path: index_path.clone(),
      source,
    })?;
    let entry = ProfilesIndex::parse(&text)
      .default_entry()
      .ok_or(ResolutionError::NoDefaultProfile { index: index_path })?;

    let resolved = if entry.is_relative {
      base.join(&entry.path)
    } else {
      PathBuf::from(&entry.path)
    };

    match fs::metadata(&resolved) {
      Ok(m) if m.is_dir() => {}
      Ok(_) => return Err(ResolutionError::ProfileDirectoryMissing { path: resolved }),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(ResolutionError::ProfileDirectoryMissing { path: resolved });
      }
      Err(source) => {
        return Err(ResolutionError::IndexUnreadable { path: resolved, source });
      }
    }

    debug!(profile = %resolved.display(), source = ?entry.source, "resolved active profile");

    Ok(ProfileLocation {
      base_directory: base.to_path_buf(),
      profile_relative_path: entry.path,
      resolved_absolute_path: resolved,
      source: entry.source,
      is_relative: entry.is_relative,
      profile_name: entry.name,
    })
  }
}
