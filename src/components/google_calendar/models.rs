use serde::{Deserialize, Serialize};

/// Start or end of an event, either a timestamp or an all-day date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// A timed start or end (RFC 3339)
    pub fn timestamp(value: &str) -> Self {
        Self {
            date_time: Some(value.to_string()),
            ..Default::default()
        }
    }

    /// An all-day start or end (YYYY-MM-DD)
    pub fn all_day(value: &str) -> Self {
        Self {
            date: Some(value.to_string()),
            ..Default::default()
        }
    }
}

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

/// Page of results from the events list endpoint
#[derive(Debug, Deserialize, Default)]
pub(crate) struct EventsResponse {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
}
