use crate::error::{AppError, AppResult};
use crate::reminder::{Reminder, Vehicle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Vehicles and reminders as exported from the fleet API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl FleetSnapshot {
    pub fn find_reminder(&self, id: &str) -> AppResult<&Reminder> {
        self.reminders
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::validation(format!("no reminder with id {id}")))
    }
}

/// Load a fleet snapshot from a JSON file
pub fn load_snapshot(path: &Path) -> AppResult<FleetSnapshot> {
    if !path.exists() {
        return Err(AppError::snapshot(format!(
            "snapshot not found at {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::snapshot(format!("failed to read {}: {}", path.display(), e)))?;

    let snapshot: FleetSnapshot = serde_json::from_str(&content)?;

    tracing::debug!(
        path = %path.display(),
        vehicles = snapshot.vehicles.len(),
        reminders = snapshot.reminders.len(),
        "loaded fleet snapshot"
    );

    Ok(snapshot)
}
