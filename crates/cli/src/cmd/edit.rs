//! Implementation of `prefguard set` and `prefguard unset`.
//!
//! Both rewrite the current user.js in place, preserving comments and the
//! order of other statements. The read and the write happen under the same
//! target lock as a regular apply.

use anyhow::{Result, bail};
use prefguard_lib::document::parse_value_literal;

use super::{Outcome, Overrides, load_engine, report};
use crate::output::{OutputFormat, print_info};

pub fn cmd_set(key: &str, value: &str, overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let Some(value) = parse_value_literal(value) else {
    bail!("Invalid value `{value}`: expected true, false, a number or a double-quoted string");
  };

  let engine = load_engine(overrides)?;
  let result = engine.edit("set", |doc| {
    doc.set(key, value);
    true
  })?;
  report(&result, "set", output)
}

pub fn cmd_unset(key: &str, overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;

  let mut found = true;
  let result = engine.edit("unset", |doc| {
    found = doc.remove(key);
    found
  })?;

  if result.accepted && !found {
    print_info(&format!("\"{key}\" is not set"));
    return Ok(Outcome::Done);
  }
  report(&result, "unset", output)
}
