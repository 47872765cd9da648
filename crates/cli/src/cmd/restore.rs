//! Implementation of the `prefguard restore` command.

use anyhow::Result;

use super::{Outcome, Overrides, load_engine, report};
use crate::output::{OutputFormat, print_info};
use crate::prompts::confirm;

/// Writes a backup generation (default: the newest) back over user.js.
pub fn cmd_restore(
  generation: Option<usize>,
  force: bool,
  overrides: &Overrides,
  output: OutputFormat,
) -> Result<Outcome> {
  let engine = load_engine(overrides)?;
  let index = generation.unwrap_or(1);

  // an unresolvable profile is reported by the restore itself
  if let Ok(location) = engine.resolve() {
    let question = format!(
      "Replace {} with backup generation {}?",
      location.target_path().display(),
      index
    );
    if !confirm(&question, force)? {
      print_info("Cancelled.");
      return Ok(Outcome::Done);
    }
  }

  let result = engine.restore(Some(index))?;
  report(&result, "restore", output)
}
