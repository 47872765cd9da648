use crate::consts::APP_NAME;
use std::path::PathBuf;

fn env_path(name: &str) -> Option<PathBuf> {
  std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  env_path("USERPROFILE")
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  env_path("HOME")
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> Option<PathBuf> {
  env_path("APPDATA").map(|p| p.join(APP_NAME))
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> Option<PathBuf> {
  let config_home = env_path("XDG_CONFIG_HOME").or_else(|| home_dir().map(|h| h.join(".config")))?;
  Some(config_home.join(APP_NAME))
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> Option<PathBuf> {
  env_path("LOCALAPPDATA").map(|p| p.join(APP_NAME))
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> Option<PathBuf> {
  let data_home = env_path("XDG_DATA_HOME").or_else(|| home_dir().map(|h| h.join(".local").join("share")))?;
  Some(data_home.join(APP_NAME))
}

/// Directory holding per-target lock files.
///
/// Falls back to the system temp directory when no data directory can be determined.
pub fn lock_dir() -> PathBuf {
  data_dir()
    .unwrap_or_else(|| std::env::temp_dir().join(APP_NAME))
    .join("locks")
}

/// Default config file location (`<config_dir>/config.json`).
pub fn config_file() -> Option<PathBuf> {
  config_dir().map(|d| d.join("config.json"))
}

/// Candidate browser base directories, in priority order.
///
/// The first entry is the regular package install; the following ones are the
/// sandboxed variants (Snap, Flatpak), which keep their own profile tree.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn default_profile_roots() -> Vec<PathBuf> {
  let Some(home) = home_dir() else {
    return Vec::new();
  };
  vec![
    home.join(".mozilla").join("firefox"),
    home.join("snap").join("firefox").join("common").join(".mozilla").join("firefox"),
    home
      .join(".var")
      .join("app")
      .join("org.mozilla.firefox")
      .join(".mozilla")
      .join("firefox"),
  ]
}

/// Candidate browser base directories, in priority order.
#[cfg(target_os = "macos")]
pub fn default_profile_roots() -> Vec<PathBuf> {
  home_dir()
    .map(|home| vec![home.join("Library").join("Application Support").join("Firefox")])
    .unwrap_or_default()
}

/// Candidate browser base directories, in priority order.
#[cfg(windows)]
pub fn default_profile_roots() -> Vec<PathBuf> {
  env_path("APPDATA")
    .map(|appdata| vec![appdata.join("Mozilla").join("Firefox")])
    .unwrap_or_default()
}
