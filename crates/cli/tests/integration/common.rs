//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A process name nothing on the test machine runs.
pub const NO_SUCH_PROCESS: &str = "prefguard-test-no-such-process";

/// Isolated test environment.
///
/// Each test gets its own home, config, data and Firefox directories, with one
/// default profile.
pub struct TestEnv {
  pub temp: TempDir,
  pub firefox_root: PathBuf,
  pub target: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let firefox_root = temp.path().join("home").join(".mozilla").join("firefox");
    let profile = firefox_root.join("Profiles").join("t3st.default-release");
    std::fs::create_dir_all(&profile).unwrap();
    std::fs::write(
      firefox_root.join("profiles.ini"),
      "[Profile0]\nName=default-release\nIsRelative=1\nPath=Profiles/t3st.default-release\n\n\
       [Install308046B0AF4A39CB]\nDefault=Profiles/t3st.default-release\nLocked=1\n",
    )
    .unwrap();

    Self {
      target: profile.join("user.js"),
      temp,
      firefox_root,
    }
  }

  /// Environment without any Firefox installation.
  pub fn without_firefox() -> Self {
    let env = Self::new();
    std::fs::remove_dir_all(&env.firefox_root).unwrap();
    env
  }

  /// A `prefguard` command isolated to this environment.
  pub fn cmd(&self) -> Command {
    let home = self.temp.path().join("home");
    let mut cmd = cargo_bin_cmd!("prefguard");
    cmd
      .env("HOME", &home)
      .env("USERPROFILE", &home)
      .env("XDG_CONFIG_HOME", self.temp.path().join("config"))
      .env("XDG_DATA_HOME", self.temp.path().join("data"))
      .env("APPDATA", self.temp.path().join("config"))
      .env("LOCALAPPDATA", self.temp.path().join("data"))
      .env("PREFGUARD_PROFILE_ROOT", &self.firefox_root)
      .env("PREFGUARD_PROCESS_NAMES", NO_SUCH_PROCESS)
      .env_remove("PREFGUARD_CONFIG")
      .env_remove("PREFGUARD_BACKUP_DEPTH")
      .env_remove("RUST_LOG");
    cmd
  }

  /// Write a file relative to the temp directory and return its path.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn write_target(&self, content: &str) {
    std::fs::write(&self.target, content).unwrap();
  }

  pub fn read_target(&self) -> Option<String> {
    std::fs::read_to_string(&self.target).ok()
  }

  pub fn backup(&self, generation: usize) -> PathBuf {
    backup_path(&self.target, generation)
  }
}

pub fn backup_path(target: &Path, generation: usize) -> PathBuf {
  target.with_file_name(format!("user.js.backup.{generation}"))
}

/// Parse the stdout of a `-o json` run.
pub fn json_stdout(output: &std::process::Output) -> serde_json::Value {
  serde_json::from_slice(&output.stdout)
    .unwrap_or_else(|e| panic!("invalid JSON output: {e}\n{}", String::from_utf8_lossy(&output.stdout)))
}
