//! Implementation of the `prefguard diff` command.

use std::path::Path;

use anyhow::{Context, Result};

use super::{Outcome, Overrides, load_engine, read_input};
use crate::output::{OutputFormat, print_diff, print_info, print_json, print_stat};

/// Shows what `apply` would change, without changing anything.
pub fn cmd_diff(input: &Path, overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;
  let proposed = read_input(input)?;
  let preview = engine.diff(&proposed).context("Failed to compute diff")?;

  if output.is_json() {
    print_json(&preview)?;
    return Ok(Outcome::Done);
  }

  if preview.summary.is_empty() {
    print_info(&format!("No changes to {}", preview.target_path.display()));
    return Ok(Outcome::Done);
  }

  if !preview.target_exists {
    print_info(&format!("{} does not exist yet", preview.target_path.display()));
  }
  print_diff(&preview.hunks);
  println!();
  print_stat("Added", &preview.summary.added.to_string());
  print_stat("Removed", &preview.summary.removed.to_string());
  print_stat("Unchanged", &preview.summary.unchanged.to_string());

  Ok(Outcome::Done)
}
