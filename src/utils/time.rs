use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Step used when walking out of a DST gap
const GAP_STEP_MINUTES: i64 = 15;
/// Longest DST gap we try to walk out of
const MAX_GAP_STEPS: i64 = 4 * 3;

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times pick the earliest or latest candidate, and times inside a
/// gap move towards the nearest valid time in the direction of `prefer_latest`.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime, prefer_latest: bool) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, latest) => {
            Some(if prefer_latest { latest } else { earliest })
        }
        LocalResult::None => {
            let step = if prefer_latest {
                Duration::minutes(-GAP_STEP_MINUTES)
            } else {
                Duration::minutes(GAP_STEP_MINUTES)
            };
            let mut candidate = naive;
            for _ in 0..MAX_GAP_STEPS {
                candidate = candidate.checked_add_signed(step)?;
                if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
                    return Some(dt);
                }
            }
            None
        }
    }
}

/// First instant of `date` in `tz`
pub fn start_of_day(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    resolve_local(tz, date.and_hms_opt(0, 0, 0)?, false)
}

/// Last millisecond of `date` in `tz`
pub fn end_of_day(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    resolve_local(tz, date.and_hms_milli_opt(23, 59, 59, 999)?, true)
}

/// The most recent Sunday on or before the local date of `now`
pub fn most_recent_sunday(now: &DateTime<Tz>) -> NaiveDate {
    let today = now.date_naive();
    let days_since_sunday = today.weekday().num_days_from_sunday() as i64;
    today - Duration::days(days_since_sunday)
}

/// Inclusive start and end instants of the week `weeks_from_now` weeks after the current one
pub fn week_boundaries(now: &DateTime<Tz>, weeks_from_now: u32) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let tz = now.timezone();
    let week_start = most_recent_sunday(now)
        .checked_add_signed(Duration::days(weeks_from_now as i64 * 7))?;
    let week_end = week_start.checked_add_signed(Duration::days(6))?;

    Some((start_of_day(&tz, week_start)?, end_of_day(&tz, week_end)?))
}
