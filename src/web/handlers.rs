use super::auth::{Session, SIGNIN_ERRORS};
use super::error::PageError;
use super::templates::{
    IndexTemplate, ProductJamsTemplate, SigninTemplate, SlackSettingsTemplate, WeekView,
};
use super::AppState;
use crate::components::slack::mask_webhook_url;
use askama::Template;
use axum::{
    extract::{Extension, Query, State},
    response::{Html, IntoResponse},
};
use serde::Deserialize;

/// Query parameters of the sign-in page
#[derive(Debug, Deserialize)]
pub struct SigninParams {
    pub error: Option<String>,
}

/// Handler for the sign-in page
pub async fn signin_page(Query(params): Query<SigninParams>) -> Result<Html<String>, PageError> {
    // Only explain error codes we issued ourselves
    let error = params.error.and_then(|code| {
        SIGNIN_ERRORS
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, message)| message.to_string())
    });

    let page = SigninTemplate {
        user_name: String::new(),
        error,
    };
    Ok(Html(page.render()?))
}

/// Handler for the dashboard
pub async fn index_handler(Extension(session): Extension<Session>) -> Result<Html<String>, PageError> {
    let page = IndexTemplate {
        user_name: session.claims.display_name(),
    };
    Ok(Html(page.render()?))
}

/// Handler for the weekly Product Jams page
pub async fn product_jams_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, PageError> {
    let now = state.digest.now();
    let events = state
        .digest
        .collect(state.calendar.as_ref(), &session.claims.access_token, &now)
        .await?;

    let tz = state.digest.timezone();
    let weeks = state
        .digest
        .buckets(&events, &now)
        .iter()
        .map(|bucket| WeekView::from_bucket(bucket, &tz))
        .collect();

    let settings = state.digest.settings();
    let page = ProductJamsTemplate {
        user_name: session.claims.display_name(),
        week_count: settings.week_count,
        exclude_keyword: settings.exclude_keyword.clone(),
        weeks,
        webhook_configured: state.slack.config().is_configured(),
        cooldown_ms: state.cooldown.interval().as_millis() as u64,
    };
    Ok(Html(page.render()?))
}

/// Handler for the Slack settings page
pub async fn slack_settings_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, PageError> {
    let slack = state.slack.config();
    let page = SlackSettingsTemplate {
        user_name: session.claims.display_name(),
        configured: slack.is_configured(),
        masked_url: slack.webhook_url.as_deref().map(mask_webhook_url),
        default_channel: slack.default_channel.clone(),
    };
    Ok(Html(page.render()?))
}

/// Handler for health checks
pub async fn health_handler() -> impl IntoResponse {
    "OK"
}
