use super::models::CalendarEvent;
use crate::utils::time::start_of_day;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// Format of all-day event dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of timed events in digests, e.g. "Jan 5, Sun"
pub const DISPLAY_FORMAT: &str = "%b %-d, %a";

/// Resolve the event start to a single instant.
///
/// Timed events use their timestamp, all-day events start at local midnight.
/// Returns `None` when the start is missing or cannot be parsed.
pub fn resolve_start(event: &CalendarEvent, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Some(date_time) = &event.start.date_time {
        DateTime::parse_from_rfc3339(date_time)
            .ok()
            .map(|dt| dt.with_timezone(tz))
    } else if let Some(date) = &event.start.date {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
        start_of_day(tz, date)
    } else {
        None
    }
}

/// Human readable start for display.
///
/// All-day dates are shown as-is; unparsable timestamps fall back to the raw string.
pub fn display_time(event: &CalendarEvent, tz: &Tz) -> String {
    if let Some(date_time) = &event.start.date_time {
        match DateTime::parse_from_rfc3339(date_time) {
            Ok(dt) => dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
            Err(_) => date_time.clone(),
        }
    } else {
        event.start.date.clone().unwrap_or_default()
    }
}
