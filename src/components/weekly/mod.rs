//! Grouping of calendar events into consecutive Sunday-to-Saturday weeks.

use crate::components::google_calendar::models::CalendarEvent;
use crate::components::google_calendar::time::resolve_start;
use crate::config::MAX_WEEK_COUNT;
use crate::utils::time::week_boundaries;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, warn};

/// One week of events, borrowed from the list it was built from
#[derive(Debug, Clone, Serialize)]
pub struct WeekBucket<'a> {
    /// e.g. "Week of Jan 5-Jan 11, 2025"
    #[serde(rename = "week")]
    pub label: String,
    /// Local midnight of the week's Sunday
    #[serde(skip)]
    pub start: DateTime<Tz>,
    /// Last millisecond of the week's Saturday
    #[serde(skip)]
    pub end: DateTime<Tz>,
    /// Events starting within `[start, end]`, in source order
    pub events: Vec<&'a CalendarEvent>,
}

impl WeekBucket<'_> {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether `instant` falls inside this week, both ends inclusive
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

/// Label shown for a week
pub fn week_label(start: &DateTime<Tz>, end: &DateTime<Tz>) -> String {
    format!(
        "Week of {}-{}",
        start.format("%b %-d"),
        end.format("%b %-d, %Y")
    )
}

/// Split `events` into `week_count` consecutive weeks starting with the week containing `now`.
///
/// Weeks start on Sunday in the timezone of `now`. Empty weeks are kept so
/// callers can show them. Events whose start cannot be resolved match no week.
pub fn bucket_by_week<'a>(
    events: &'a [CalendarEvent],
    week_count: u32,
    now: &DateTime<Tz>,
) -> Vec<WeekBucket<'a>> {
    let tz = now.timezone();

    let resolved: Vec<(&CalendarEvent, Option<DateTime<Tz>>)> = events
        .iter()
        .map(|event| {
            let start = resolve_start(event, &tz);
            if start.is_none() {
                debug!("Event {} has no usable start, leaving it out of the weekly view", event.id);
            }
            (event, start)
        })
        .collect();

    let mut buckets = Vec::with_capacity(week_count.min(MAX_WEEK_COUNT) as usize);

    for index in 0..week_count {
        let Some((start, end)) = week_boundaries(now, index) else {
            warn!("Week {} after {} is out of range", index, now);
            break;
        };

        let mut bucket = WeekBucket {
            label: week_label(&start, &end),
            start,
            end,
            events: Vec::new(),
        };

        bucket.events = resolved
            .iter()
            .filter(|(_, instant)| instant.as_ref().is_some_and(|i| bucket.contains(i)))
            .map(|(event, _)| *event)
            .collect();

        buckets.push(bucket);
    }

    buckets
}
