//! Time utilities: resolve local wall-clock times for a day into UTC.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ScheduleError;

pub fn parse_timezone(tz: &str) -> Result<Tz, ScheduleError> {
    tz.parse()
        .map_err(|_| ScheduleError::InvalidTimezone(tz.to_string()))
}

/// `day` at `hour:minute` local time in `tz`, as UTC.
///
/// Hours up to 24 are accepted (24:00 is the next midnight). DST gaps and
/// overlaps are rejected rather than guessed.
pub fn local_to_utc(
    day: NaiveDate,
    hour: u32,
    minute: u32,
    tz: Tz,
) -> Result<DateTime<Utc>, ScheduleError> {
    let (day, hour) = if hour == 24 && minute == 0 {
        let next = day
            .succ_opt()
            .ok_or_else(|| ScheduleError::InvalidTemplate(format!("no day after {day}")))?;
        (next, 0)
    } else {
        (day, hour)
    };

    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        ScheduleError::InvalidTemplate(format!("invalid local time {hour:02}:{minute:02}"))
    })?;

    let local = tz
        .from_local_datetime(&day.and_time(time))
        .single()
        .ok_or_else(|| {
            ScheduleError::InvalidTemplate(format!(
                "ambiguous or nonexistent local time (DST?): {day} {hour:02}:{minute:02} {tz}"
            ))
        })?;

    Ok(local.with_timezone(&Utc))
}

/// Helper: format a UTC time into RFC3339.
pub fn to_rfc3339_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
