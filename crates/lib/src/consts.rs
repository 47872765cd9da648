/// Application name used for config/data directory names.
pub const APP_NAME: &str = "prefguard";

/// The user-override preference file inside a profile directory.
pub const TARGET_FILENAME: &str = "user.js";

/// The profile index file in a browser's base directory.
pub const INDEX_FILENAME: &str = "profiles.ini";

/// Number of backup generations kept per target unless configured otherwise.
pub const DEFAULT_BACKUP_DEPTH: usize = 5;

/// Infix between the target file name and the generation index.
pub const BACKUP_INFIX: &str = "backup";

/// Environment variable pointing at an alternate config file.
pub const ENV_CONFIG: &str = "PREFGUARD_CONFIG";

/// Environment variable overriding the backup depth.
pub const ENV_BACKUP_DEPTH: &str = "PREFGUARD_BACKUP_DEPTH";

/// Environment variable replacing the profile candidate list with a single base directory.
pub const ENV_PROFILE_ROOT: &str = "PREFGUARD_PROFILE_ROOT";

/// Environment variable overriding the watched process names (comma separated).
pub const ENV_PROCESS_NAMES: &str = "PREFGUARD_PROCESS_NAMES";
