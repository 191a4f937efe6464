pub mod config;
pub mod error;
pub mod fleet;
pub mod recurrence;
pub mod reminder;
pub mod snapshot;
pub mod status;

use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use error::{AppError, AppResult};
pub use fleet::{apply_completion, classify_fleet, FleetReport, StatusCounts, VehicleReport};
pub use recurrence::{complete_and_regenerate, schedule_after_service, CompletionOutcome, RecurrenceInterval};
pub use reminder::{Reminder, Vehicle};
pub use snapshot::{load_snapshot, FleetSnapshot};
pub use status::{
    active_reminder_count, classify, classify_all, due_signals, ClassifiedReminder, DueSignals,
    ReminderStatus,
};

const USAGE: &str = "usage:
  fleet-reminders status [--file PATH] [--date YYYY-MM-DD]
  fleet-reminders complete <REMINDER_ID> <MILEAGE> <YYYY-MM-DD> [--file PATH]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status {
        file: Option<PathBuf>,
        date: Option<NaiveDate>,
    },
    Complete {
        file: Option<PathBuf>,
        reminder_id: String,
        mileage: u64,
        date: NaiveDate,
    },
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    reminder::parse_calendar_date(raw)
        .ok_or_else(|| AppError::validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> AppResult<Command> {
    let mut args = args.into_iter();
    let name = args
        .next()
        .ok_or_else(|| AppError::validation(USAGE))?;

    let mut file = None;
    let mut date = None;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => {
                let value = args
                    .next()
                    .ok_or_else(|| AppError::validation("--file needs a path"))?;
                file = Some(PathBuf::from(value));
            }
            "--date" => {
                let value = args
                    .next()
                    .ok_or_else(|| AppError::validation("--date needs a value"))?;
                date = Some(parse_date(&value)?);
            }
            flag if flag.starts_with("--") => {
                return Err(AppError::validation(format!("unknown option {flag}\n{USAGE}")));
            }
            _ => positional.push(arg),
        }
    }

    match (name.as_str(), positional.as_slice()) {
        ("status", []) => Ok(Command::Status { file, date }),
        ("complete", [reminder_id, mileage, completed_on]) => {
            if date.is_some() {
                return Err(AppError::validation(
                    "complete takes the completion date as a positional argument",
                ));
            }
            let mileage = mileage
                .parse::<u64>()
                .map_err(|_| AppError::validation(format!("invalid mileage '{mileage}'")))?;
            Ok(Command::Complete {
                file,
                reminder_id: reminder_id.clone(),
                mileage,
                date: parse_date(completed_on)?,
            })
        }
        _ => Err(AppError::validation(USAGE)),
    }
}

fn open_snapshot(file: Option<PathBuf>) -> AppResult<FleetSnapshot> {
    let path = config::snapshot_path(file)
        .ok_or_else(|| AppError::snapshot("could not resolve a snapshot location"))?;
    load_snapshot(&path)
}

/// Classify the whole snapshot as of `now`.
pub fn fleet_status(snapshot: &FleetSnapshot, now: NaiveDate) -> FleetReport {
    classify_fleet(&snapshot.vehicles, &snapshot.reminders, now)
}

/// Complete one reminder from the snapshot. Nothing is written back.
pub fn complete_reminder(
    snapshot: &FleetSnapshot,
    reminder_id: &str,
    mileage: u64,
    date: NaiveDate,
) -> AppResult<CompletionOutcome> {
    let reminder = snapshot.find_reminder(reminder_id)?;
    complete_and_regenerate(reminder, mileage, date)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(config::LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Command-line entry point; prints JSON for the caller to persist.
pub fn run<I: IntoIterator<Item = String>>(args: I) -> Result<(), String> {
    init_logging();

    let output = match parse_args(args)? {
        Command::Status { file, date } => {
            let snapshot = open_snapshot(file)?;
            let now = date.unwrap_or_else(|| Local::now().date_naive());
            serde_json::to_string_pretty(&fleet_status(&snapshot, now))
        }
        Command::Complete {
            file,
            reminder_id,
            mileage,
            date,
        } => {
            let snapshot = open_snapshot(file)?;
            let outcome = complete_reminder(&snapshot, &reminder_id, mileage, date)?;
            serde_json::to_string_pretty(&outcome)
        }
    }
    .map_err(|e| AppError::from(e).to_string())?;

    println!("{output}");
    Ok(())
}
