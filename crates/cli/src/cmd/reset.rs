//! Implementation of the `prefguard reset` command.
//!
//! Removes user.js so the browser starts from its own defaults. The removed
//! file is kept as backup generation 1 and can be brought back with
//! `prefguard restore`.

use anyhow::Result;

use super::{Outcome, Overrides, load_engine, report};
use crate::output::{OutputFormat, print_info};
use crate::prompts::confirm;

pub fn cmd_reset(force: bool, overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;

  if let Ok(location) = engine.resolve() {
    let question = format!("Remove {}?", location.target_path().display());
    if !confirm(&question, force)? {
      print_info("Cancelled.");
      return Ok(Outcome::Done);
    }
  }

  let result = engine.reset()?;
  report(&result, "reset", output)
}
