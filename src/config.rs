//! Engine configuration constants
//!
//! Centralized configuration for the reminder engine and its command-line surface.

use std::path::PathBuf;

/// Default due-soon lead distance; 0 means only due/overdue is alarmed
pub const DEFAULT_THRESHOLD_MILES: u64 = 0;

/// Default due-soon lead time in days
pub const DEFAULT_THRESHOLD_DAYS: u64 = 0;

/// Directory under the local data dir holding fleet snapshots
pub const DATA_DIR_NAME: &str = "FleetReminders";

/// Snapshot file name inside the data directory
pub const SNAPSHOT_FILE_NAME: &str = "fleet.json";

/// Environment variable overriding the snapshot path
pub const SNAPSHOT_PATH_ENV: &str = "FLEET_REMINDERS_SNAPSHOT";

/// Environment variable holding the log filter directive
pub const LOG_FILTER_ENV: &str = "FLEET_REMINDERS_LOG";

/// Log filter used when the environment does not set one
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Resolve where the fleet snapshot lives: explicit path, then env, then data dir.
pub fn snapshot_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }

    if let Some(path) = std::env::var_os(SNAPSHOT_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    dirs::data_local_dir().map(|dir| dir.join(DATA_DIR_NAME).join(SNAPSHOT_FILE_NAME))
}
