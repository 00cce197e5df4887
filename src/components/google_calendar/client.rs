use super::models::{CalendarEvent, EventsResponse};
use crate::error::{google_calendar_error, unauthorized_error, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};
use url::Url;

/// Base URL of the Google Calendar v3 API
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Most events returned by one search
pub const MAX_RESULTS: u32 = 100;

/// What to search for in a calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub calendar_id: String,
    pub search_query: Option<String>,
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
}

impl EventQuery {
    pub fn new(calendar_id: &str) -> Self {
        Self {
            calendar_id: calendar_id.to_string(),
            search_query: None,
            time_min: None,
            time_max: None,
        }
    }

    pub fn search(mut self, query: &str) -> Self {
        self.search_query = Some(query.to_string());
        self
    }

    pub fn between(mut self, time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        self.time_min = Some(time_min);
        self.time_max = Some(time_max);
        self
    }
}

/// Anything that can list calendar events for an access token
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events matching `query`, ordered by start time
    async fn list_events(&self, access_token: &str, query: &EventQuery) -> AppResult<Vec<CalendarEvent>>;
}

/// Client for the Google Calendar events API
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    api_base: String,
}

impl Default for GoogleCalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleCalendarClient {
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Point the client at another API root, e.g. a mock server
    pub fn with_api_base(api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.to_string(),
        }
    }

    /// Build the events list URL with query parameters
    fn events_url(&self, query: &EventQuery) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API base URL cannot have a path"))?
            .pop_if_empty()
            .extend(&["calendars", query.calendar_id.as_str(), "events"]);

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(q) = &query.search_query {
                pairs.append_pair("q", q);
            }
            if let Some(time_min) = &query.time_min {
                pairs.append_pair("timeMin", &time_min.to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            if let Some(time_max) = &query.time_max {
                pairs.append_pair("timeMax", &time_max.to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            pairs.append_pair("singleEvents", "true");
            pairs.append_pair("orderBy", "startTime");
            pairs.append_pair("maxResults", &MAX_RESULTS.to_string());
        }

        Ok(url)
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn list_events(&self, access_token: &str, query: &EventQuery) -> AppResult<Vec<CalendarEvent>> {
        let url = self.events_url(query)?;
        debug!("Fetching events from calendar {}", query.calendar_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!("Google Calendar rejected the access token: HTTP {}", status);
            return Err(unauthorized_error("Google Calendar rejected the access token"));
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let page: EventsResponse = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

        info!("Fetched {} events from calendar {}", page.items.len(), query.calendar_id);
        Ok(page.items)
    }
}
