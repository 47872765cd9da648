//! Implementation of the `prefguard validate` command.
//!
//! Validation never touches the profile, so this works without a resolvable
//! Firefox installation.

use std::path::Path;

use anyhow::Result;

use super::{Outcome, Overrides, load_engine, read_input};
use crate::output::{OutputFormat, print_error, print_json, print_success, print_warning};

pub fn cmd_validate(input: &Path, overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;
  let text = read_input(input)?;
  let result = engine.validate(&text);

  if output.is_json() {
    print_json(&result)?;
    return Ok(result.valid.into());
  }

  for issue in &result.errors {
    print_error(&format!("line {}: {}", issue.line, issue.message));
  }
  for issue in &result.warnings {
    print_warning(&format!("line {}: {}", issue.line, issue.message));
  }

  if result.valid {
    print_success(&format!(
      "Valid: {} statement(s), {} warning(s)",
      result.statement_count,
      result.warnings.len()
    ));
  } else {
    print_error(&format!("Invalid: {} error(s)", result.errors.len()));
  }

  Ok(result.valid.into())
}
