//! prefguard-lib: safe editing of a browser profile's `user.js`
//!
//! This crate provides the engine behind the `prefguard` CLI:
//! - `profile`: locating the active profile from `profiles.ini`
//! - `document`: line-oriented model of preference files
//! - `validate`: static checks, deny list and known preference catalog
//! - `diff`: line diff between on-disk and proposed text
//! - `backup`: rotating backup history next to the target
//! - `apply`: guarded apply, restore and reset
//! - `recovery`: the recovery actions available for a target

pub mod apply;
pub mod backup;
pub mod config;
pub mod consts;
pub mod diff;
pub mod document;
pub mod error;
pub mod platform;
pub mod profile;
pub mod recovery;
pub mod target_lock;
pub mod util;
pub mod validate;

pub use apply::{ApplyOptions, ApplyResult, CurrentConfig, DiffPreview, RejectReason, SafeApplyController};
pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, GuardError, StorageError, ValidationError};

/// The engine entry point.
pub type Engine = SafeApplyController;
