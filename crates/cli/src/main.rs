mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{Outcome, Overrides};
use output::{OutputFormat, print_error};

/// prefguard - inspect and safely edit a Firefox profile's user.js
#[derive(Parser)]
#[command(name = "prefguard")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase log verbosity (-v info, -vv debug)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Firefox base directory containing profiles.ini (replaces the default search list)
  #[arg(long, global = true, value_name = "DIR")]
  profile_root: Option<PathBuf>,

  /// Number of backup generations to keep
  #[arg(long, global = true, value_name = "N")]
  backup_depth: Option<usize>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the active user.js, or a starting template if there is none
  Current {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Check a preference file without applying it
  Validate {
    /// File to check, or `-` for stdin
    input: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show what applying a file would change
  Diff {
    /// Proposed user.js, or `-` for stdin
    input: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Replace user.js with a validated file, keeping a backup
  Apply {
    /// Proposed user.js, or `-` for stdin
    input: PathBuf,

    /// Do not back up the current user.js first
    #[arg(long)]
    skip_backup: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Set one preference in user.js
  Set {
    /// Preference name, e.g. gfx.webrender.all
    key: String,

    /// Value literal: true, false, a number or a double-quoted string
    value: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Remove one preference from user.js
  Unset {
    /// Preference name
    key: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Restore a backup generation (default: the newest)
  Restore {
    /// Generation to restore, 1 being the newest
    generation: Option<usize>,

    /// Skip confirmation prompt
    #[arg(long)]
    force: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// List backups and the recovery actions available
  Recovery {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Remove user.js so the browser uses its defaults (a backup is kept)
  Reset {
    /// Skip confirmation prompt
    #[arg(long)]
    force: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show which profile is active and where its user.js lives
  Profile {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn init_tracing(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<Outcome> {
  let overrides = Overrides {
    profile_root: cli.profile_root,
    backup_depth: cli.backup_depth,
  };

  match cli.command {
    Commands::Current { output } => cmd::cmd_current(&overrides, output),
    Commands::Validate { input, output } => cmd::cmd_validate(&input, &overrides, output),
    Commands::Diff { input, output } => cmd::cmd_diff(&input, &overrides, output),
    Commands::Apply {
      input,
      skip_backup,
      output,
    } => cmd::cmd_apply(&input, skip_backup, &overrides, output),
    Commands::Set { key, value, output } => cmd::cmd_set(&key, &value, &overrides, output),
    Commands::Unset { key, output } => cmd::cmd_unset(&key, &overrides, output),
    Commands::Restore {
      generation,
      force,
      output,
    } => cmd::cmd_restore(generation, force, &overrides, output),
    Commands::Recovery { output } => cmd::cmd_recovery(&overrides, output),
    Commands::Reset { force, output } => cmd::cmd_reset(force, &overrides, output),
    Commands::Profile { output } => cmd::cmd_profile(&overrides, output),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(Outcome::Done) => ExitCode::SUCCESS,
    Ok(Outcome::Rejected) => ExitCode::from(2),
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
