use crate::reminder::{Reminder, Vehicle};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Urgency of a reminder, derived fresh on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderStatus {
    Overdue,
    DueSoon,
    Upcoming,
    NoDueCondition,
    Inactive,
}

impl ReminderStatus {
    /// Overdue and due-soon reminders drive dashboard badges.
    pub fn is_alarmed(self) -> bool {
        matches!(self, ReminderStatus::Overdue | ReminderStatus::DueSoon)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderStatus::Overdue => "OVERDUE",
            ReminderStatus::DueSoon => "DUE_SOON",
            ReminderStatus::Upcoming => "UPCOMING",
            ReminderStatus::NoDueCondition => "NO_DUE_CONDITION",
            ReminderStatus::Inactive => "INACTIVE",
        }
    }

    // Lower = shown first
    fn rank(self) -> u8 {
        match self {
            ReminderStatus::Overdue => 0,
            ReminderStatus::DueSoon => 1,
            ReminderStatus::Upcoming => 2,
            ReminderStatus::NoDueCondition => 3,
            ReminderStatus::Inactive => 4,
        }
    }
}

/// Distance to each due condition; negative means past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueSignals {
    pub remaining_miles: Option<i64>,
    pub remaining_days: Option<i64>,
}

impl DueSignals {
    pub fn is_empty(&self) -> bool {
        self.remaining_miles.is_none() && self.remaining_days.is_none()
    }

    /// Past the line in any dimension.
    pub fn is_overdue(&self) -> bool {
        self.remaining_miles.is_some_and(|miles| miles <= 0)
            || self.remaining_days.is_some_and(|days| days <= 0)
    }

    /// Inside the pre-warning window in any dimension.
    pub fn is_within(&self, threshold_miles: u64, threshold_days: u64) -> bool {
        self.remaining_miles
            .is_some_and(|miles| miles <= to_signed(threshold_miles))
            || self
                .remaining_days
                .is_some_and(|days| days <= to_signed(threshold_days))
    }

    // Missing signals sort after present ones
    fn nearness(&self) -> (i64, i64) {
        (
            self.remaining_days.unwrap_or(i64::MAX),
            self.remaining_miles.unwrap_or(i64::MAX),
        )
    }
}

/// A reminder together with the status computed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedReminder {
    pub reminder: Reminder,
    pub status: ReminderStatus,
    pub signals: DueSignals,
}

impl ClassifiedReminder {
    /// Overdue first, then due-soon, upcoming, undated, inactive; nearer due first; id last.
    ///
    /// Miles and days have no common unit, so "nearer" compares remaining days
    /// first and remaining miles only between reminders whose days tie (or that
    /// have no date). A reminder 10 miles from due with a due date a year out
    /// therefore ranks after one 5,000 miles away that is due in 200 days.
    pub fn urgency_cmp(&self, other: &Self) -> Ordering {
        self.status
            .rank()
            .cmp(&other.status.rank())
            .then_with(|| self.signals.nearness().cmp(&other.signals.nearness()))
            .then_with(|| id_cmp(&self.reminder.id, &other.reminder.id))
    }
}

/// Whole calendar days from `from` until `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn due_signals(vehicle: &Vehicle, reminder: &Reminder, now: NaiveDate) -> DueSignals {
    DueSignals {
        remaining_miles: reminder
            .due_by_mileage
            .map(|due| to_signed(due).saturating_sub(to_signed(vehicle.current_mileage))),
        remaining_days: reminder.due_by_date.map(|due| days_between(now, due)),
    }
}

pub fn classify(vehicle: &Vehicle, reminder: &Reminder, now: NaiveDate) -> ReminderStatus {
    classify_with_signals(vehicle, reminder, now).0
}

fn classify_with_signals(
    vehicle: &Vehicle,
    reminder: &Reminder,
    now: NaiveDate,
) -> (ReminderStatus, DueSignals) {
    if !reminder.is_active {
        return (ReminderStatus::Inactive, DueSignals::default());
    }

    let signals = due_signals(vehicle, reminder, now);
    let status = if signals.is_empty() {
        ReminderStatus::NoDueCondition
    } else if signals.is_overdue() {
        ReminderStatus::Overdue
    } else if signals.is_within(
        reminder.reminder_threshold_miles,
        reminder.reminder_threshold_days,
    ) {
        ReminderStatus::DueSoon
    } else {
        ReminderStatus::Upcoming
    };

    (status, signals)
}

/// Classify every reminder owned by `vehicle`, most urgent first.
/// Reminders belonging to another vehicle are skipped.
pub fn classify_all(
    vehicle: &Vehicle,
    reminders: &[Reminder],
    now: NaiveDate,
) -> Vec<ClassifiedReminder> {
    let mut classified: Vec<ClassifiedReminder> = reminders
        .iter()
        .filter(|reminder| {
            let owned = reminder.vehicle_id == vehicle.id;
            if !owned {
                tracing::warn!(
                    reminder_id = %reminder.id,
                    reminder_vehicle = %reminder.vehicle_id,
                    vehicle = %vehicle.id,
                    "skipping reminder that belongs to another vehicle"
                );
            }
            owned
        })
        .map(|reminder| {
            let (status, signals) = classify_with_signals(vehicle, reminder, now);
            tracing::trace!(
                reminder_id = %reminder.id,
                status = status.as_str(),
                remaining_miles = ?signals.remaining_miles,
                remaining_days = ?signals.remaining_days,
                "classified reminder"
            );
            ClassifiedReminder {
                reminder: reminder.clone(),
                status,
                signals,
            }
        })
        .collect();

    classified.sort_by(ClassifiedReminder::urgency_cmp);

    tracing::debug!(
        vehicle = %vehicle.id,
        mileage = vehicle.current_mileage,
        %now,
        total = classified.len(),
        alarmed = active_reminder_count(&classified),
        "classified reminders"
    );

    classified
}

/// Number of overdue or due-soon reminders; the dashboard badge value.
pub fn active_reminder_count(classified: &[ClassifiedReminder]) -> usize {
    classified
        .iter()
        .filter(|entry| entry.status.is_alarmed())
        .count()
}

// Numeric ids (as the API hands out) order by value and come before text ids
fn id_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_reminder(id: &str) -> Reminder {
        let mut reminder = Reminder::new("v1", "oil_change");
        reminder.id = id.to_string();
        reminder
    }

    fn mileage_reminder(id: &str, due: u64, threshold: u64) -> Reminder {
        let mut reminder = make_reminder(id);
        reminder.due_by_mileage = Some(due);
        reminder.reminder_threshold_miles = threshold;
        reminder
    }

    fn date_reminder(id: &str, due: NaiveDate, threshold_days: u64) -> Reminder {
        let mut reminder = make_reminder(id);
        reminder.due_by_date = Some(due);
        reminder.reminder_threshold_days = threshold_days;
        reminder
    }

    #[test]
    fn test_inactive_wins_over_due_conditions() {
        let vehicle = Vehicle::new("v1", 90_000);
        let mut reminder = mileage_reminder("r1", 50_000, 0);
        reminder.due_by_date = Some(date(2020, 1, 1));
        reminder.is_active = false;

        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::Inactive
        );
    }

    #[test]
    fn test_no_due_condition() {
        let vehicle = Vehicle::new("v1", 10_000);
        let reminder = make_reminder("r1");
        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::NoDueCondition
        );
    }

    #[test]
    fn test_mileage_past_due_is_overdue() {
        let vehicle = Vehicle::new("v1", 50_100);
        let reminder = mileage_reminder("r1", 50_000, 2_000);
        let now = date(2024, 1, 1);

        assert_eq!(classify(&vehicle, &reminder, now), ReminderStatus::Overdue);
        assert_eq!(
            due_signals(&vehicle, &reminder, now).remaining_miles,
            Some(-100)
        );
    }

    #[test]
    fn test_exactly_at_due_mileage_is_overdue() {
        let vehicle = Vehicle::new("v1", 50_000);
        let reminder = mileage_reminder("r1", 50_000, 0);
        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::Overdue
        );
    }

    #[test]
    fn test_mileage_within_threshold_is_due_soon() {
        let vehicle = Vehicle::new("v1", 48_500);
        let reminder = mileage_reminder("r1", 50_000, 2_000);
        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::DueSoon
        );
    }

    #[test]
    fn test_mileage_outside_threshold_is_upcoming() {
        let vehicle = Vehicle::new("v1", 48_500);
        let reminder = mileage_reminder("r1", 50_000, 1_000);
        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::Upcoming
        );
    }

    #[test]
    fn test_zero_threshold_disables_pre_warning() {
        let vehicle = Vehicle::new("v1", 49_999);
        let reminder = mileage_reminder("r1", 50_000, 0);
        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::Upcoming
        );
    }

    #[test]
    fn test_remaining_equal_to_threshold_is_due_soon() {
        let now = date(2024, 5, 1);

        let vehicle = Vehicle::new("v1", 48_000);
        let by_miles = mileage_reminder("r1", 50_000, 2_000);
        assert_eq!(classify(&vehicle, &by_miles, now), ReminderStatus::DueSoon);

        let vehicle = Vehicle::new("v1", 0);
        let by_date = date_reminder("r2", date(2024, 5, 15), 14);
        assert_eq!(
            due_signals(&vehicle, &by_date, now).remaining_days,
            Some(14)
        );
        assert_eq!(classify(&vehicle, &by_date, now), ReminderStatus::DueSoon);
    }

    #[test]
    fn test_one_past_threshold_is_upcoming() {
        let now = date(2024, 5, 1);
        let vehicle = Vehicle::new("v1", 47_999);
        let by_miles = mileage_reminder("r1", 50_000, 2_000);
        assert_eq!(classify(&vehicle, &by_miles, now), ReminderStatus::Upcoming);

        let by_date = date_reminder("r2", date(2024, 5, 16), 14);
        assert_eq!(classify(&vehicle, &by_date, now), ReminderStatus::Upcoming);
    }

    #[test]
    fn test_date_ten_days_out_with_fourteen_day_threshold_is_due_soon() {
        let vehicle = Vehicle::new("v1", 0);
        let now = date(2024, 5, 1);
        let reminder = date_reminder("r1", date(2024, 5, 11), 14);

        assert_eq!(classify(&vehicle, &reminder, now), ReminderStatus::DueSoon);
        assert_eq!(
            due_signals(&vehicle, &reminder, now).remaining_days,
            Some(10)
        );
    }

    #[test]
    fn test_due_date_today_is_overdue() {
        let vehicle = Vehicle::new("v1", 0);
        let now = date(2024, 5, 1);
        let reminder = date_reminder("r1", now, 0);
        assert_eq!(classify(&vehicle, &reminder, now), ReminderStatus::Overdue);
    }

    #[test]
    fn test_overdue_mileage_with_future_date_is_overdue() {
        let vehicle = Vehicle::new("v1", 61_000);
        let mut reminder = mileage_reminder("r1", 60_000, 0);
        reminder.due_by_date = Some(date(2030, 1, 1));

        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::Overdue
        );
    }

    #[test]
    fn test_either_dimension_in_window_is_due_soon() {
        let vehicle = Vehicle::new("v1", 10_000);
        let mut reminder = mileage_reminder("r1", 40_000, 500);
        reminder.due_by_date = Some(date(2024, 1, 20));
        reminder.reminder_threshold_days = 30;

        assert_eq!(
            classify(&vehicle, &reminder, date(2024, 1, 1)),
            ReminderStatus::DueSoon
        );
    }

    #[test]
    fn test_deeply_overdue_signals_are_not_clamped() {
        let vehicle = Vehicle::new("v1", 80_000);
        let mut reminder = mileage_reminder("r1", 50_000, 0);
        reminder.due_by_date = Some(date(2023, 1, 1));
        let signals = due_signals(&vehicle, &reminder, date(2024, 1, 1));

        assert_eq!(signals.remaining_miles, Some(-30_000));
        assert_eq!(signals.remaining_days, Some(-365));
    }

    #[test]
    fn test_classify_all_orders_by_urgency() {
        let vehicle = Vehicle::new("v1", 48_500);
        let now = date(2024, 5, 1);

        let mut inactive = mileage_reminder("a-inactive", 10_000, 0);
        inactive.is_active = false;

        let reminders = vec![
            mileage_reminder("b-upcoming", 90_000, 0),
            make_reminder("c-undated"),
            inactive,
            mileage_reminder("d-soon", 50_000, 2_000),
            mileage_reminder("e-overdue", 48_000, 0),
            date_reminder("f-overdue-date", date(2024, 4, 1), 0),
        ];

        let classified = classify_all(&vehicle, &reminders, now);
        let statuses: Vec<ReminderStatus> = classified.iter().map(|c| c.status).collect();

        assert_eq!(
            statuses,
            vec![
                ReminderStatus::Overdue,
                ReminderStatus::Overdue,
                ReminderStatus::DueSoon,
                ReminderStatus::Upcoming,
                ReminderStatus::NoDueCondition,
                ReminderStatus::Inactive,
            ]
        );
        assert_eq!(active_reminder_count(&classified), 3);
    }

    #[test]
    fn test_classify_all_breaks_ties_by_nearness_then_id() {
        let vehicle = Vehicle::new("v1", 10_000);
        let now = date(2024, 1, 1);
        let reminders = vec![
            mileage_reminder("r3", 20_000, 0),
            mileage_reminder("r2", 15_000, 0),
            mileage_reminder("r1", 20_000, 0),
        ];

        let ids: Vec<String> = classify_all(&vehicle, &reminders, now)
            .into_iter()
            .map(|c| c.reminder.id)
            .collect();

        assert_eq!(ids, vec!["r2", "r1", "r3"]);
    }

    #[test]
    fn test_days_rank_before_miles_within_a_status() {
        let vehicle = Vehicle::new("v1", 10_000);
        let now = date(2024, 1, 1);

        let mut close_miles = mileage_reminder("a", 10_010, 100);
        close_miles.due_by_date = Some(date(2025, 1, 1));
        close_miles.reminder_threshold_days = 7;

        let mut close_date = mileage_reminder("c", 15_000, 6_000);
        close_date.due_by_date = Some(date(2024, 7, 19));

        let classified = classify_all(&vehicle, &[close_miles, close_date], now);
        assert!(classified.iter().all(|c| c.status == ReminderStatus::DueSoon));
        assert_eq!(classified[0].reminder.id, "c");
        assert_eq!(classified[1].reminder.id, "a");
    }

    #[test]
    fn test_numeric_ids_tie_break_by_value() {
        let vehicle = Vehicle::new("v1", 10_000);
        let reminders = vec![
            mileage_reminder("10", 20_000, 0),
            mileage_reminder("abc", 20_000, 0),
            mileage_reminder("9", 20_000, 0),
        ];

        let ids: Vec<String> = classify_all(&vehicle, &reminders, date(2024, 1, 1))
            .into_iter()
            .map(|c| c.reminder.id)
            .collect();

        assert_eq!(ids, vec!["9", "10", "abc"]);
    }

    #[test]
    fn test_classify_all_skips_other_vehicles() {
        let vehicle = Vehicle::new("v1", 10_000);
        let mut foreign = mileage_reminder("r2", 5_000, 0);
        foreign.vehicle_id = "v2".to_string();
        let reminders = vec![mileage_reminder("r1", 5_000, 0), foreign];

        let classified = classify_all(&vehicle, &reminders, date(2024, 1, 1));
        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].reminder.id, "r1");
    }

    #[test]
    fn test_inactive_never_counts() {
        let vehicle = Vehicle::new("v1", 99_000);
        let mut reminder = mileage_reminder("r1", 1_000, 0);
        reminder.is_active = false;

        let classified = classify_all(&vehicle, &[reminder], date(2024, 1, 1));
        assert_eq!(active_reminder_count(&classified), 0);
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ReminderStatus::DueSoon).unwrap();
        assert_eq!(json, "\"DUE_SOON\"");
        assert_eq!(ReminderStatus::NoDueCondition.as_str(), "NO_DUE_CONDITION");
    }
}
