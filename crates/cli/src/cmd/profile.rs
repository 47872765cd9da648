//! Implementation of the `prefguard profile` command.

use anyhow::{Context, Result};
use prefguard_lib::profile::DefaultSource;

use super::{Outcome, Overrides, load_engine};
use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_profile(overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;
  let location = engine.resolve().context("Failed to resolve the active profile")?;

  if output.is_json() {
    print_json(&location)?;
    return Ok(Outcome::Done);
  }

  let source = match location.source {
    DefaultSource::Install => "installation default",
    DefaultSource::ProfileFlag => "profile marked Default=1",
  };

  print_success(&format!(
    "Active profile: {}",
    location.profile_name.as_deref().unwrap_or(&location.profile_relative_path)
  ));
  print_stat("Base directory", &location.base_directory.display().to_string());
  print_stat("Profile path", &location.profile_relative_path);
  print_stat("Resolved", &location.resolved_absolute_path.display().to_string());
  print_stat("Chosen by", source);
  print_stat("Target", &location.target_path().display().to_string());

  Ok(Outcome::Done)
}
