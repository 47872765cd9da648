//! Shared helpers for engine integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use prefguard_lib::SafeApplyController;
use prefguard_lib::backup::BackupStore;
use prefguard_lib::platform::{ProbeError, ProcessProbe};
use prefguard_lib::profile::ProfileResolver;
use prefguard_lib::validate::ConfigValidator;
use tempfile::TempDir;

/// Process probe whose answer the test controls.
#[derive(Default)]
pub struct SwitchProbe {
  running: AtomicBool,
}

impl SwitchProbe {
  pub fn set_running(&self, running: bool) {
    self.running.store(running, Ordering::SeqCst);
  }
}

impl ProcessProbe for SwitchProbe {
  fn is_running(&self) -> Result<bool, ProbeError> {
    Ok(self.running.load(Ordering::SeqCst))
  }
}

/// A fake Firefox install with one default profile.
pub struct Profile {
  pub temp: TempDir,
  pub root: PathBuf,
  pub target: PathBuf,
  pub probe: Arc<SwitchProbe>,
}

impl Profile {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join(".mozilla").join("firefox");
    let profile_dir = root.join("Profiles").join("x1y2z3.default-release");
    fs::create_dir_all(&profile_dir).unwrap();
    fs::write(
      root.join("profiles.ini"),
      "[Profile0]\nName=default-release\nIsRelative=1\nPath=Profiles/x1y2z3.default-release\nDefault=1\n\n\
       [General]\nStartWithLastProfile=1\nVersion=2\n",
    )
    .unwrap();

    Self {
      target: profile_dir.join("user.js"),
      temp,
      root,
      probe: Arc::new(SwitchProbe::default()),
    }
  }

  pub fn controller(&self, depth: usize) -> SafeApplyController {
    SafeApplyController::new(
      ProfileResolver::new(vec![self.root.clone()]),
      self.probe.clone(),
      ConfigValidator::default(),
      BackupStore::new(depth),
    )
    .with_lock_dir(self.temp.path().join("locks"))
  }

  pub fn read_target(&self) -> Option<String> {
    fs::read_to_string(&self.target).ok()
  }

  pub fn write_target(&self, content: &str) {
    fs::write(&self.target, content).unwrap();
  }

  pub fn backup_count(&self) -> usize {
    BackupStore::default().list(&self.target).unwrap().len()
  }

  /// Every entry in the profile directory, with file content, sorted by name.
  /// Directories are listed with a trailing `/` and no content.
  pub fn files(&self) -> Vec<(String, Vec<u8>)> {
    let dir: &Path = self.target.parent().unwrap();
    let mut files: Vec<_> = fs::read_dir(dir)
      .unwrap()
      .map(|e| e.unwrap())
      .map(|e| {
        let name = e.file_name().to_string_lossy().into_owned();
        if e.file_type().unwrap().is_dir() {
          (format!("{name}/"), Vec::new())
        } else {
          (name, fs::read(e.path()).unwrap())
        }
      })
      .collect();
    files.sort();
    files
  }
}
