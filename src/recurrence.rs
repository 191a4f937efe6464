use crate::error::{AppError, AppResult};
use crate::reminder::{fresh_id, Reminder};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Offset of the next occurrence from a completed service. A zero interval counts as unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceInterval {
    pub miles: Option<u64>,
    pub months: Option<u32>,
}

impl RecurrenceInterval {
    fn effective_miles(&self) -> Option<u64> {
        self.miles.filter(|miles| *miles > 0)
    }

    fn effective_months(&self) -> Option<u32> {
        self.months.filter(|months| *months > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.effective_miles().is_none() && self.effective_months().is_none()
    }

    pub fn next_due_mileage(&self, from_mileage: u64) -> Option<u64> {
        self.effective_miles()
            .map(|miles| from_mileage.saturating_add(miles))
    }

    /// Month arithmetic clamps to the end of shorter months (Jan 31 + 1 month = Feb 28/29).
    pub fn next_due_date(&self, from_date: NaiveDate) -> AppResult<Option<NaiveDate>> {
        match self.effective_months() {
            None => Ok(None),
            Some(months) => from_date
                .checked_add_months(Months::new(months))
                .map(Some)
                .ok_or_else(|| {
                    AppError::configuration(format!(
                        "{from_date} plus {months} months is outside the supported calendar"
                    ))
                }),
        }
    }
}

/// Records produced by completing a reminder, for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    /// The completed occurrence, retired
    pub updated_original: Reminder,
    /// The next occurrence, only for recurring reminders
    pub next: Option<Reminder>,
}

/// Retire `reminder` as serviced and, if it recurs, build its successor.
///
/// A recurring reminder without any interval is rejected before anything is produced.
pub fn complete_and_regenerate(
    reminder: &Reminder,
    completion_mileage: u64,
    completion_date: NaiveDate,
) -> AppResult<CompletionOutcome> {
    reminder.check_recurrence()?;

    if !reminder.is_active {
        tracing::warn!(reminder_id = %reminder.id, "completing a reminder that is already inactive");
    }

    let next = if reminder.is_recurring {
        Some(next_occurrence(
            reminder,
            completion_mileage,
            completion_date,
        )?)
    } else {
        None
    };

    let mut updated_original = reminder.clone();
    updated_original.last_completed_mileage = Some(completion_mileage);
    updated_original.last_completed_date = Some(completion_date);
    updated_original.is_active = false;

    match &next {
        Some(next) => tracing::info!(
            reminder_id = %reminder.id,
            next_id = %next.id,
            due_by_mileage = ?next.due_by_mileage,
            due_by_date = ?next.due_by_date,
            "completed recurring reminder"
        ),
        None => tracing::info!(reminder_id = %reminder.id, "completed reminder"),
    }

    Ok(CompletionOutcome {
        updated_original,
        next,
    })
}

/// Follow-up reminder for a service that was just performed, e.g. when a
/// maintenance record is logged with a service interval.
pub fn schedule_after_service(
    vehicle_id: &str,
    service_type: &str,
    serviced_mileage: u64,
    serviced_date: NaiveDate,
    interval: RecurrenceInterval,
) -> AppResult<Reminder> {
    if interval.is_empty() {
        return Err(AppError::configuration(format!(
            "cannot schedule {service_type} for vehicle {vehicle_id} without a mileage or month interval"
        )));
    }

    let mut template = Reminder::new(vehicle_id, service_type);
    template.is_recurring = true;
    template.recurring_interval_miles = interval.miles;
    template.recurring_interval_months = interval.months;

    next_occurrence(&template, serviced_mileage, serviced_date)
}

fn next_occurrence(
    template: &Reminder,
    from_mileage: u64,
    from_date: NaiveDate,
) -> AppResult<Reminder> {
    let interval = template.recurrence_interval();

    Ok(Reminder {
        id: fresh_id(),
        vehicle_id: template.vehicle_id.clone(),
        service_type: template.service_type.clone(),
        description: template.description.clone(),
        due_by_mileage: interval.next_due_mileage(from_mileage),
        due_by_date: interval.next_due_date(from_date)?,
        reminder_threshold_miles: template.reminder_threshold_miles,
        reminder_threshold_days: template.reminder_threshold_days,
        is_recurring: true,
        recurring_interval_miles: template.recurring_interval_miles,
        recurring_interval_months: template.recurring_interval_months,
        last_completed_date: None,
        last_completed_mileage: None,
        is_active: true,
    })
}
