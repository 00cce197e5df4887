use crate::components::google_calendar::time::display_time;
use crate::components::weekly::WeekBucket;
use askama::Template;
use chrono_tz::Tz;

/// One event as shown on the weekly page
#[derive(Debug, Clone)]
pub struct EventView {
    pub title: String,
    pub time: String,
    pub location: Option<String>,
    pub link: Option<String>,
}

/// One week as shown on the weekly page
#[derive(Debug, Clone)]
pub struct WeekView {
    pub label: String,
    pub events: Vec<EventView>,
}

impl WeekView {
    pub fn from_bucket(bucket: &WeekBucket<'_>, tz: &Tz) -> Self {
        Self {
            label: bucket.label.clone(),
            events: bucket
                .events
                .iter()
                .map(|event| EventView {
                    title: event.summary.clone(),
                    time: display_time(event, tz),
                    location: event.location.clone(),
                    link: event.html_link.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user_name: String,
}

#[derive(Template)]
#[template(path = "signin.html")]
pub struct SigninTemplate {
    pub user_name: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "product_jams.html")]
pub struct ProductJamsTemplate {
    pub user_name: String,
    pub week_count: u32,
    pub exclude_keyword: Option<String>,
    pub weeks: Vec<WeekView>,
    pub webhook_configured: bool,
    pub cooldown_ms: u64,
}

#[derive(Template)]
#[template(path = "slack_settings.html")]
pub struct SlackSettingsTemplate {
    pub user_name: String,
    pub configured: bool,
    pub masked_url: Option<String>,
    pub default_channel: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}
