//! Catalog of known preferences.
//!
//! The catalog only feeds validator warnings and the `user.js` template; it
//! never blocks a write.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::PrefValue;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("failed to read preference catalog {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse preference catalog {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Inclusive numeric bounds for a known preference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
  pub min: f64,
  pub max: f64,
}

impl ValueRange {
  pub fn contains(&self, v: f64) -> bool {
    v >= self.min && v <= self.max
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownPreference {
  pub key: String,
  /// Recommended value; also fixes the expected type.
  pub expected: PrefValue,
  pub description: String,
  pub category: String,
  #[serde(default)]
  pub range: Option<ValueRange>,
}

/// Lookup of known preferences by key.
pub trait PreferenceRegistry: Send + Sync {
  fn lookup(&self, key: &str) -> Option<&KnownPreference>;

  /// All entries, ordered by category then key.
  fn entries(&self) -> Vec<&KnownPreference>;
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
  entries: BTreeMap<String, KnownPreference>,
}

impl Catalog {
  pub fn from_entries(entries: impl IntoIterator<Item = KnownPreference>) -> Self {
    Self {
      entries: entries.into_iter().map(|e| (e.key.clone(), e)).collect(),
    }
  }

  /// Loads a catalog from a JSON array of [`KnownPreference`] objects.
  pub fn from_json_file(path: &Path) -> Result<Self, RegistryError> {
    let content = fs::read_to_string(path).map_err(|source| RegistryError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let entries: Vec<KnownPreference> = serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Self::from_entries(entries))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Performance tuning preferences shipped with the tool.
  pub fn builtin() -> Self {
    fn entry(key: &str, expected: PrefValue, category: &str, description: &str) -> KnownPreference {
      KnownPreference {
        key: key.to_string(),
        expected,
        description: description.to_string(),
        category: category.to_string(),
        range: None,
      }
    }
    fn ranged(key: &str, expected: i64, min: f64, max: f64, category: &str, description: &str) -> KnownPreference {
      KnownPreference {
        range: Some(ValueRange { min, max }),
        ..entry(key, PrefValue::Int(expected), category, description)
      }
    }

    use PrefValue::Bool;
    Self::from_entries([
      entry("gfx.webrender.all", Bool(true), "graphics", "Force the WebRender compositor"),
      entry(
        "gfx.webrender.compositor.force-enabled",
        Bool(true),
        "graphics",
        "Use the native OS compositor with WebRender",
      ),
      entry(
        "layers.acceleration.force-enabled",
        Bool(true),
        "graphics",
        "Force hardware layer acceleration",
      ),
      entry("gfx.canvas.accelerated", Bool(true), "graphics", "GPU accelerated 2D canvas"),
      ranged("layout.frame_rate", -1, -1.0, 1000.0, "graphics", "Frame rate cap, -1 follows the display"),
      entry(
        "media.ffmpeg.vaapi.enabled",
        Bool(true),
        "media",
        "VA-API hardware video decoding on Linux",
      ),
      entry(
        "media.hardware-video-decoding.force-enabled",
        Bool(true),
        "media",
        "Force hardware video decoding",
      ),
      entry("media.rdd-ffmpeg.enabled", Bool(true), "media", "Decode media in the RDD process"),
      entry(
        "widget.dmabuf.force-enabled",
        Bool(true),
        "media",
        "Share GPU buffers via DMA-BUF on Wayland/X11",
      ),
      ranged(
        "browser.cache.memory.capacity",
        524288,
        -1.0,
        16_777_216.0,
        "cache",
        "Memory cache size in KiB, -1 lets the browser decide",
      ),
      ranged(
        "browser.cache.disk.capacity",
        1_048_576,
        0.0,
        16_777_216.0,
        "cache",
        "Disk cache size in KiB",
      ),
      ranged(
        "browser.sessionstore.interval",
        15000,
        1000.0,
        3_600_000.0,
        "session",
        "Milliseconds between session store writes",
      ),
      entry(
        "browser.tabs.unloadOnLowMemory",
        Bool(true),
        "session",
        "Unload background tabs under memory pressure",
      ),
      ranged(
        "network.http.max-connections",
        900,
        1.0,
        65535.0,
        "network",
        "Maximum concurrent HTTP connections",
      ),
      ranged(
        "network.http.max-persistent-connections-per-server",
        6,
        1.0,
        255.0,
        "network",
        "Keep-alive connections per server",
      ),
      ranged("dom.ipc.processCount", 8, 1.0, 64.0, "process", "Number of content processes"),
      entry("fission.autostart", Bool(true), "process", "Site isolation"),
    ])
  }
}

impl PreferenceRegistry for Catalog {
  fn lookup(&self, key: &str) -> Option<&KnownPreference> {
    self.entries.get(key)
  }

  fn entries(&self) -> Vec<&KnownPreference> {
    let mut all: Vec<_> = self.entries.values().collect();
    all.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.key.cmp(&b.key)));
    all
  }
}
