use crate::recurrence::CompletionOutcome;
use crate::reminder::{Reminder, Vehicle};
use crate::status::{classify_all, ClassifiedReminder, ReminderStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-status tallies for a set of classified reminders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub overdue: usize,
    pub due_soon: usize,
    pub upcoming: usize,
    pub no_due_condition: usize,
    pub inactive: usize,
}

impl StatusCounts {
    pub fn from_classified(classified: &[ClassifiedReminder]) -> Self {
        let mut counts = Self::default();
        for entry in classified {
            counts.record(entry.status);
        }
        counts
    }

    fn record(&mut self, status: ReminderStatus) {
        match status {
            ReminderStatus::Overdue => self.overdue += 1,
            ReminderStatus::DueSoon => self.due_soon += 1,
            ReminderStatus::Upcoming => self.upcoming += 1,
            ReminderStatus::NoDueCondition => self.no_due_condition += 1,
            ReminderStatus::Inactive => self.inactive += 1,
        }
    }

    fn add(&mut self, other: &StatusCounts) {
        self.overdue += other.overdue;
        self.due_soon += other.due_soon;
        self.upcoming += other.upcoming;
        self.no_due_condition += other.no_due_condition;
        self.inactive += other.inactive;
    }

    pub fn active_reminder_count(&self) -> usize {
        self.overdue + self.due_soon
    }
}

/// One vehicle card: its reminders, most urgent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleReport {
    pub vehicle_id: String,
    pub current_mileage: u64,
    pub reminders: Vec<ClassifiedReminder>,
    pub counts: StatusCounts,
    pub active_reminder_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetReport {
    pub as_of: NaiveDate,
    pub vehicles: Vec<VehicleReport>,
    pub counts: StatusCounts,
    pub active_reminder_count: usize,
    /// Reminders pointing at a vehicle that is not in the fleet
    pub orphaned_reminder_ids: Vec<String>,
}

/// Classify every vehicle's reminders against one shared `now`.
///
/// Vehicles keep the order they were given in.
pub fn classify_fleet(vehicles: &[Vehicle], reminders: &[Reminder], now: NaiveDate) -> FleetReport {
    let mut by_vehicle: HashMap<&str, Vec<Reminder>> = HashMap::new();
    for reminder in reminders {
        by_vehicle
            .entry(reminder.vehicle_id.as_str())
            .or_default()
            .push(reminder.clone());
    }

    let known: HashSet<&str> = vehicles.iter().map(|v| v.id.as_str()).collect();
    let mut orphaned_reminder_ids: Vec<String> = reminders
        .iter()
        .filter(|r| !known.contains(r.vehicle_id.as_str()))
        .map(|r| r.id.clone())
        .collect();
    orphaned_reminder_ids.sort();

    if !orphaned_reminder_ids.is_empty() {
        tracing::warn!(
            count = orphaned_reminder_ids.len(),
            "reminders reference vehicles missing from the fleet"
        );
    }

    let mut counts = StatusCounts::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reports = Vec::with_capacity(vehicles.len());

    for vehicle in vehicles {
        if !seen.insert(vehicle.id.as_str()) {
            tracing::warn!(vehicle = %vehicle.id, "duplicate vehicle in fleet, keeping the first");
            continue;
        }

        let owned = by_vehicle
            .get(vehicle.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let classified = classify_all(vehicle, owned, now);
        let vehicle_counts = StatusCounts::from_classified(&classified);
        counts.add(&vehicle_counts);

        reports.push(VehicleReport {
            vehicle_id: vehicle.id.clone(),
            current_mileage: vehicle.current_mileage,
            reminders: classified,
            counts: vehicle_counts,
            active_reminder_count: vehicle_counts.active_reminder_count(),
        });
    }

    FleetReport {
        as_of: now,
        vehicles: reports,
        counts,
        active_reminder_count: counts.active_reminder_count(),
        orphaned_reminder_ids,
    }
}

/// Fold a completion into a locally held reminder list: the original is
/// replaced in place and the successor, if any, appended.
pub fn apply_completion(mut reminders: Vec<Reminder>, outcome: &CompletionOutcome) -> Vec<Reminder> {
    let original = &outcome.updated_original;

    match reminders.iter_mut().find(|r| r.id == original.id) {
        Some(existing) => *existing = original.clone(),
        None => reminders.push(original.clone()),
    }

    if let Some(next) = &outcome.next {
        if !reminders.iter().any(|r| r.id == next.id) {
            reminders.push(next.clone());
        }
    }

    reminders
}
