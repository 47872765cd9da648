//! Minimal reader for the `profiles.ini` index.

use super::types::DefaultSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
  pub name: String,
  entries: Vec<(String, String)>,
}

impl Section {
  /// First value for `key`. Keys are case-sensitive.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  fn is_install(&self) -> bool {
    self.name.starts_with("Install")
  }

  fn is_profile(&self) -> bool {
    self.name.starts_with("Profile")
  }
}

/// The entry the index designates as active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultEntry {
  pub path: String,
  pub is_relative: bool,
  pub source: DefaultSource,
  pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilesIndex {
  sections: Vec<Section>,
}

impl ProfilesIndex {
  pub fn parse(text: &str) -> Self {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut sections: Vec<Section> = Vec::new();

    for line in text.lines() {
      let line = line.trim();
      if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
        continue;
      }
      if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
        sections.push(Section {
          name: name.trim().to_string(),
          entries: Vec::new(),
        });
        continue;
      }
      // entries before the first section header are ignored
      let (Some(section), Some((key, value))) = (sections.last_mut(), line.split_once('=')) else {
        continue;
      };
      section.entries.push((key.trim().to_string(), value.trim().to_string()));
    }

    Self { sections }
  }

  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  /// Picks the active profile.
  ///
  /// An install-locked default wins over any `Default=1` profile flag; with
  /// several install sections the first with `Locked=1` is preferred.
  pub fn default_entry(&self) -> Option<DefaultEntry> {
    self.install_default().or_else(|| self.flagged_default())
  }

  fn install_default(&self) -> Option<DefaultEntry> {
    let installs: Vec<&Section> = self
      .sections
      .iter()
      .filter(|s| s.is_install() && s.get("Default").is_some_and(|d| !d.is_empty()))
      .collect();
    let chosen = installs
      .iter()
      .find(|s| s.get("Locked") == Some("1"))
      .or_else(|| installs.first())?;
    let path = chosen.get("Default")?.to_string();

    let profile = self.profile_with_path(&path);
    let is_relative = match profile.and_then(|p| p.get("IsRelative")) {
      Some(flag) => flag != "0",
      None => !std::path::Path::new(&path).is_absolute(),
    };

    Some(DefaultEntry {
      name: profile.and_then(|p| p.get("Name")).map(str::to_string),
      path,
      is_relative,
      source: DefaultSource::Install,
    })
  }

  fn flagged_default(&self) -> Option<DefaultEntry> {
    let section = self
      .sections
      .iter()
      .filter(|s| s.is_profile())
      .find(|s| s.get("Default") == Some("1") && s.get("Path").is_some_and(|p| !p.is_empty()))?;

    Some(DefaultEntry {
      path: section.get("Path")?.to_string(),
      is_relative: section.get("IsRelative") != Some("0"),
      source: DefaultSource::ProfileFlag,
      name: section.get("Name").map(str::to_string),
    })
  }

  fn profile_with_path(&self, path: &str) -> Option<&Section> {
    self.sections.iter().filter(|s| s.is_profile()).find(|s| s.get("Path") == Some(path))
  }
}
