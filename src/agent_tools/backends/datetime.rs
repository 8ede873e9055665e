//! Date/Time Backend
//!
//! Calendar arithmetic for the date/time agent: current date/time snapshots,
//! age calculation, day differences, business-day counting, fiscal-year
//! boundaries, and policy expiry checks. Everything here is pure chrono math;
//! there is no external service behind this backend.
//!
//! Functions that take a "today"/"now" argument do so explicitly so callers
//! (and tests) control the reference instant; the agent handlers pass the
//! current UTC time.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::agent_tools::endpoint::EndpointError;

/// Default fiscal-year start month (October).
pub const DEFAULT_FISCAL_YEAR_START_MONTH: u32 = 10;

/// Fixed (month, day) holidays skipped when advancing to a business day:
/// New Year's Day, Independence Day, Christmas Day.
const FIXED_HOLIDAYS: [(u32, u32); 3] = [(1, 1), (7, 4), (12, 25)];

/// The current date, time, weekday, and timezone, formatted for agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeSnapshot {
    /// `mm/dd/YYYY`.
    pub date: String,
    /// `HH:MM:SS`, 24-hour clock.
    pub time: String,
    /// Weekday name, e.g. "Tuesday".
    pub day: String,
    /// Always "UTC"; snapshots are sampled in UTC.
    pub timezone: String,
}

/// Snapshot of the current UTC date and time.
pub fn current_date_time() -> DateTimeSnapshot {
    let now = Utc::now();
    DateTimeSnapshot {
        date: now.format("%m/%d/%Y").to_string(),
        time: now.format("%H:%M:%S").to_string(),
        day: now.format("%A").to_string(),
        timezone: "UTC".to_string(),
    }
}

/// Parse a `YYYY-MM-DD` date query parameter.
pub fn parse_date(raw: &str) -> Result<NaiveDate, EndpointError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        EndpointError::InvalidParameter(format!(
            "'{}' is not a date in 'YYYY-MM-DD' format",
            raw
        ))
    })
}

/// Parse a `YYYY-MM-DD HH:MM:SS` datetime query parameter.
pub fn parse_date_time(raw: &str) -> Result<NaiveDateTime, EndpointError> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S").map_err(|_| {
        EndpointError::InvalidParameter(format!(
            "'{}' is not a datetime in 'YYYY-MM-DD HH:MM:SS' format",
            raw
        ))
    })
}

/// Age in whole years at `today`, decremented when the birthday has not yet
/// occurred this year.
pub fn calculate_age(birth_date: NaiveDate, today: NaiveDate) -> Result<i32, EndpointError> {
    if birth_date > today {
        return Err(EndpointError::InvalidParameter(
            "birth_date is in the future".to_string(),
        ));
    }
    let not_yet = (today.month(), today.day()) < (birth_date.month(), birth_date.day());
    Ok(today.year() - birth_date.year() - if not_yet { 1 } else { 0 })
}

/// Signed number of days from `start_date` to `end_date`.
pub fn date_diff(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days()
}

/// Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business days in `[start_date, end_date)`: the start date counts when it is
/// a weekday, the end date never does. An inverted range yields 0.
pub fn business_days_between(start_date: NaiveDate, end_date: NaiveDate) -> u64 {
    let mut count = 0;
    let mut current = start_date;
    while current < end_date {
        if is_business_day(current) {
            count += 1;
        }
        current += Duration::days(1);
    }
    count
}

fn is_fixed_holiday(date: NaiveDate) -> bool {
    FIXED_HOLIDAYS.contains(&(date.month(), date.day()))
}

/// The first day after `date` that is a weekday and not a fixed holiday.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while !is_business_day(next) || is_fixed_holiday(next) {
        next += Duration::days(1);
    }
    next
}

fn check_start_month(fiscal_year_start_month: u32) -> Result<(), EndpointError> {
    if fiscal_year_start_month < 1 || fiscal_year_start_month > 12 {
        return Err(EndpointError::InvalidParameter(
            "fiscal_year_start_month must be between 1 and 12".to_string(),
        ));
    }
    Ok(())
}

/// Fiscal year containing `date` for a fiscal year beginning in
/// `fiscal_year_start_month`. Dates before the start month belong to the
/// previous fiscal year.
pub fn fiscal_year(date: NaiveDate, fiscal_year_start_month: u32) -> Result<i32, EndpointError> {
    check_start_month(fiscal_year_start_month)?;
    let mut year = date.year();
    if date.month() < fiscal_year_start_month {
        year -= 1;
    }
    Ok(year)
}

/// First and last day of the fiscal year containing `date`.
pub fn fiscal_year_range(
    date: NaiveDate,
    fiscal_year_start_month: u32,
) -> Result<(NaiveDate, NaiveDate), EndpointError> {
    let fy = fiscal_year(date, fiscal_year_start_month)?;
    let start = NaiveDate::from_ymd_opt(fy, fiscal_year_start_month, 1)
        .ok_or_else(|| EndpointError::Internal("fiscal year start out of range".to_string()))?;
    let next_start = NaiveDate::from_ymd_opt(fy + 1, fiscal_year_start_month, 1)
        .ok_or_else(|| EndpointError::Internal("fiscal year end out of range".to_string()))?;
    Ok((start, next_start - Duration::days(1)))
}

/// Render the expiry status of a named policy relative to `now`.
pub fn policy_status(policy_name: &str, expiry: NaiveDateTime, now: NaiveDateTime) -> String {
    let formatted = expiry.format("%Y-%m-%d %H:%M:%S");
    if now >= expiry {
        format!("The {} policy has expired on {}", policy_name, formatted)
    } else {
        format!(
            "The {} policy is still valid and will expire on {}",
            policy_name, formatted
        )
    }
}
