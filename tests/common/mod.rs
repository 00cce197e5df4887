#![allow(dead_code)]

use async_trait::async_trait;
use chief_of_staff::components::google_calendar::{
    CalendarEvent, EventDateTime, EventQuery, EventSource, TokenResponse, UserInfo,
};
use chief_of_staff::components::slack::WebhookPolicy;
use chief_of_staff::config::Config;
use chief_of_staff::error::AppResult;
use chief_of_staff::web::AppState;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory event source that records what it was asked for
#[derive(Debug, Default)]
pub struct MockEventSource {
    events: Vec<CalendarEvent>,
    pub calls: Mutex<Vec<(String, EventQuery)>>,
}

impl MockEventSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn access_tokens(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(token, _)| token.clone())
            .collect()
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn list_events(&self, access_token: &str, query: &EventQuery) -> AppResult<Vec<CalendarEvent>> {
        self.calls
            .lock()
            .unwrap()
            .push((access_token.to_string(), query.clone()));
        Ok(self.events.clone())
    }
}

pub fn timed_event(id: &str, summary: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        start: EventDateTime::timestamp(start),
        end: EventDateTime::timestamp(start),
        location: None,
        html_link: Some(format!("https://calendar.google.com/event?eid={}", id)),
    }
}

/// Config built from explicit variables, never from the process environment
pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("GOOGLE_CLIENT_ID", "client-id"),
        ("GOOGLE_CLIENT_SECRET", "client-secret"),
        ("SESSION_SECRET", "test-session-secret"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Webhook policy matching a local mockito server
pub fn local_policy() -> WebhookPolicy {
    WebhookPolicy {
        scheme: "http".to_string(),
        host: "127.0.0.1".to_string(),
        path_prefix: "/services/".to_string(),
    }
}

/// Cookie header for a signed-in user
pub fn session_cookie(state: &AppState, sub: &str, access_token: &str) -> String {
    let user = UserInfo {
        sub: Some(sub.to_string()),
        email: Some(format!("{}@example.com", sub)),
        name: Some("Test User".to_string()),
    };
    let token = TokenResponse {
        access_token: access_token.to_string(),
        refresh_token: None,
        expires_in: Some(3600),
    };
    let (jwt, _) = state.sessions.issue(&user, &token).unwrap();
    format!("session={}", jwt)
}
