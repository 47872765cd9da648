//! Liveness check for the browser that consumes the preference file.
//!
//! The engine never writes while the browser is running: the browser reads
//! `user.js` on startup and rewrites `prefs.js` on exit, so a concurrent write
//! can be lost or half-applied.

use std::ffi::OsStr;

use sysinfo::{ProcessesToUpdate, System};
use thiserror::Error;
use tracing::debug;

/// Default executable names of the target browser.
pub const DEFAULT_PROCESS_NAMES: &[&str] = &["firefox", "firefox-bin", "firefox-esr"];

#[derive(Debug, Error)]
pub enum ProbeError {
  #[error("process listing is not supported on this platform")]
  Unsupported,

  #[error("process probe failed: {0}")]
  Failed(String),
}

/// Answers whether the target application is currently running.
pub trait ProcessProbe: Send + Sync {
  fn is_running(&self) -> Result<bool, ProbeError>;
}

/// Scans the OS process table for any of a set of executable names.
#[derive(Debug, Clone)]
pub struct SystemProcessProbe {
  names: Vec<String>,
}

impl SystemProcessProbe {
  pub fn new<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      names: names.into_iter().map(|n| normalize(&n.into())).collect(),
    }
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  fn matches(&self, process_name: &OsStr) -> bool {
    let name = normalize(&process_name.to_string_lossy());
    self.names.iter().any(|n| *n == name)
  }
}

impl Default for SystemProcessProbe {
  fn default() -> Self {
    Self::new(DEFAULT_PROCESS_NAMES.iter().copied())
  }
}

impl ProcessProbe for SystemProcessProbe {
  fn is_running(&self) -> Result<bool, ProbeError> {
    if !sysinfo::IS_SUPPORTED_SYSTEM {
      return Err(ProbeError::Unsupported);
    }

    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let found = system.processes().values().find(|p| self.matches(p.name()));
    match found {
      Some(process) => {
        debug!(pid = %process.pid(), name = ?process.name(), "target application is running");
        Ok(true)
      }
      None => Ok(false),
    }
  }
}

/// Lowercases and strips a trailing `.exe` so names compare across platforms.
fn normalize(name: &str) -> String {
  let lower = name.trim().to_ascii_lowercase();
  match lower.strip_suffix(".exe") {
    Some(stem) => stem.to_string(),
    None => lower,
  }
}
