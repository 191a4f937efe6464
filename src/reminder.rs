use crate::config::{DEFAULT_THRESHOLD_DAYS, DEFAULT_THRESHOLD_MILES};
use crate::error::{AppError, AppResult};
use crate::recurrence::RecurrenceInterval;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Vehicle as returned by the fleet API. Only the odometer matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_mileage: u64,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, current_mileage: u64) -> Self {
        Self {
            id: id.into(),
            current_mileage,
        }
    }
}

/// One scheduled service obligation for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    #[serde(deserialize_with = "record_id")]
    pub vehicle_id: String,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub due_by_mileage: Option<u64>,
    #[serde(default, with = "calendar_date")]
    pub due_by_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reminder_threshold_miles: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reminder_threshold_days: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_interval_miles: Option<u64>,
    #[serde(default)]
    pub recurring_interval_months: Option<u32>,
    #[serde(default, with = "calendar_date")]
    pub last_completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_completed_mileage: Option<u64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Reminder {
    /// A fresh, active, non-recurring reminder with no due condition yet.
    pub fn new(vehicle_id: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            vehicle_id: vehicle_id.into(),
            service_type: service_type.into(),
            description: None,
            due_by_mileage: None,
            due_by_date: None,
            reminder_threshold_miles: DEFAULT_THRESHOLD_MILES,
            reminder_threshold_days: DEFAULT_THRESHOLD_DAYS,
            is_recurring: false,
            recurring_interval_miles: None,
            recurring_interval_months: None,
            last_completed_date: None,
            last_completed_mileage: None,
            is_active: true,
        }
    }

    pub fn has_due_condition(&self) -> bool {
        self.due_by_mileage.is_some() || self.due_by_date.is_some()
    }

    pub fn recurrence_interval(&self) -> RecurrenceInterval {
        RecurrenceInterval {
            miles: self.recurring_interval_miles,
            months: self.recurring_interval_months,
        }
    }

    /// Fails when the reminder claims to recur but has nothing to recur by.
    pub fn check_recurrence(&self) -> AppResult<()> {
        if self.is_recurring && self.recurrence_interval().is_empty() {
            return Err(AppError::configuration(format!(
                "recurring reminder {} ({}) has no mileage or month interval",
                self.id, self.service_type
            )));
        }
        Ok(())
    }
}

/// New identity for reminders created by the engine.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_active() -> bool {
    true
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, truncated to its own calendar date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

mod calendar_date {
    use super::parse_calendar_date;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_calendar_date(text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid calendar date: {text}"))),
        }
    }
}

// The API hands out numeric ids for some records and string ids for others
fn record_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(d)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
