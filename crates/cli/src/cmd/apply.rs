//! Implementation of the `prefguard apply` command.

use std::path::Path;

use anyhow::Result;
use prefguard_lib::ApplyOptions;
use tracing::debug;

use super::{Outcome, Overrides, load_engine, read_input, report};
use crate::output::OutputFormat;

/// Replaces the active profile's user.js with the content of `input`.
///
/// Rejected when the profile cannot be resolved, the browser is running or
/// the content does not validate; in every such case nothing is written.
pub fn cmd_apply(input: &Path, skip_backup: bool, overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;
  let proposed = read_input(input)?;
  debug!(bytes = proposed.len(), skip_backup, "applying proposed preferences");

  let result = engine.apply(&proposed, ApplyOptions { skip_backup })?;
  report(&result, "apply", output)
}
