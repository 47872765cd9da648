//! Implementation of the `prefguard current` command.

use anyhow::{Context, Result};
use prefguard_lib::CurrentConfig;

use super::{Outcome, Overrides, load_engine};
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success, print_warning};

pub fn cmd_current(overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;
  let current = engine.current().context("Failed to read current preferences")?;

  if output.is_json() {
    print_json(&current)?;
    return Ok(Outcome::Done);
  }

  match &current {
    CurrentConfig::Existing {
      path,
      text,
      statement_count,
      key_count,
      malformed_lines,
    } => {
      print_success(&format!("user.js at {}", path.display()));
      print_stat("Statements", &statement_count.to_string());
      print_stat("Distinct keys", &key_count.to_string());
      if !malformed_lines.is_empty() {
        let lines: Vec<String> = malformed_lines.iter().map(|n| n.to_string()).collect();
        print_warning(&format!("Unparseable lines: {}", lines.join(", ")));
      }
      println!();
      print!("{}", text);
      if !text.is_empty() && !text.ends_with('\n') {
        println!();
      }
    }
    CurrentConfig::NotCreated { path, template } => {
      print_info(&format!("No user.js yet at {}. Starting template:", path.display()));
      println!();
      print!("{}", template);
    }
  }

  Ok(Outcome::Done)
}
