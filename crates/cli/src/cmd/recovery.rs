//! Implementation of the `prefguard recovery` command.

use anyhow::{Context, Result};
use prefguard_lib::recovery::RecoveryAction;

use super::{Outcome, Overrides, load_engine};
use crate::output::{
  OutputFormat, format_age, format_bytes, now_unix, print_info, print_json, print_stat, symbols,
};

pub fn cmd_recovery(overrides: &Overrides, output: OutputFormat) -> Result<Outcome> {
  let engine = load_engine(overrides)?;
  let options = engine.recovery_options().context("Failed to list recovery options")?;

  if output.is_json() {
    print_json(&options)?;
    return Ok(Outcome::Done);
  }

  print_stat("Target", &options.target_path.display().to_string());
  print_stat("Exists", if options.target_exists { "yes" } else { "no" });

  if options.has_backups {
    let now = now_unix();
    println!();
    println!("Backups (newest first):");
    for generation in &options.generations {
      let age = generation
        .modified_unix
        .map(|m| format_age(m, now))
        .unwrap_or_else(|| "unknown age".to_string());
      println!(
        "  {} {:>2}  {:>9}  {}",
        symbols::INFO,
        generation.index,
        format_bytes(generation.size_bytes),
        age
      );
    }
  } else {
    println!();
    print_info("No backups.");
  }

  if options.actions.is_empty() {
    print_info("Nothing to recover.");
    return Ok(Outcome::Done);
  }

  println!();
  println!("Available actions:");
  for action in &options.actions {
    let (description, command) = match action {
      RecoveryAction::RestoreLatest => ("restore the newest backup".to_string(), "prefguard restore".to_string()),
      RecoveryAction::RestoreGeneration { generation } => (
        format!("restore backup generation {generation}"),
        format!("prefguard restore {generation}"),
      ),
      RecoveryAction::DeleteToDefaults => (
        "remove user.js and use browser defaults".to_string(),
        "prefguard reset --force".to_string(),
      ),
    };
    println!("  {} {} {} {}", symbols::INFO, description, symbols::ARROW, command);
  }

  Ok(Outcome::Done)
}
