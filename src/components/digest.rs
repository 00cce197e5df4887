//! The weekly "Product Jams" digest: fetch, filter, group by week, format.

use crate::components::google_calendar::{CalendarEvent, EventQuery, EventSource};
use crate::components::slack::format_for_slack;
use crate::components::weekly::{bucket_by_week, WeekBucket};
use crate::config::{Config, DigestSettings};
use crate::error::{config_error, AppResult};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::info;

/// Builds the weekly digest for one calendar
#[derive(Debug, Clone)]
pub struct ProductJamDigest {
    settings: DigestSettings,
    calendar_id: String,
    timezone: Tz,
}

impl ProductJamDigest {
    pub fn new(settings: DigestSettings, calendar_id: &str, timezone: Tz) -> Self {
        Self {
            settings,
            calendar_id: calendar_id.to_string(),
            timezone,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.digest.clone(), &config.google_calendar_id, config.timezone)
    }

    pub fn settings(&self) -> &DigestSettings {
        &self.settings
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Current time in the digest's timezone
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Search covering `now` through the last digest week
    pub fn query(&self, now: &DateTime<Tz>) -> AppResult<EventQuery> {
        let start = now.with_timezone(&Utc);
        let end = Duration::try_days(self.settings.week_count as i64 * 7)
            .and_then(|window| start.checked_add_signed(window))
            .ok_or_else(|| {
                config_error(&format!(
                    "{} weeks after {} is out of range",
                    self.settings.week_count, start
                ))
            })?;

        Ok(EventQuery::new(&self.calendar_id)
            .search(&self.settings.search_query)
            .between(start, end))
    }

    /// Drop events whose title contains the exclusion keyword
    pub fn exclude(&self, events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
        match self.settings.exclude_keyword.as_deref() {
            Some(keyword) if !keyword.is_empty() => events
                .into_iter()
                .filter(|event| !event.summary.contains(keyword))
                .collect(),
            _ => events,
        }
    }

    /// Fetch matching events and apply the exclusion filter
    pub async fn collect(
        &self,
        source: &dyn EventSource,
        access_token: &str,
        now: &DateTime<Tz>,
    ) -> AppResult<Vec<CalendarEvent>> {
        let events = source.list_events(access_token, &self.query(now)?).await?;
        let fetched = events.len();
        let events = self.exclude(events);
        info!("Digest has {} of {} fetched events", events.len(), fetched);
        Ok(events)
    }

    /// Group `events` into the digest's weeks
    pub fn buckets<'a>(&self, events: &'a [CalendarEvent], now: &DateTime<Tz>) -> Vec<WeekBucket<'a>> {
        bucket_by_week(events, self.settings.week_count, now)
    }

    /// Slack message for `events`
    pub fn message(&self, events: &[CalendarEvent], now: &DateTime<Tz>) -> String {
        format_for_slack(&self.buckets(events, now), &self.timezone)
    }
}
