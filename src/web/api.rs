use super::auth::Session;
use super::error::ApiError;
use super::AppState;
use crate::components::slack::{mask_webhook_url, PostFailure, SlackPostResult};
use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

/// Body of a manual post request
#[derive(Debug, Default, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub channel: Option<String>,
}

/// Body of a webhook test request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookTestRequest {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Status for a failed post
fn post_failure_status(result: &SlackPostResult) -> StatusCode {
    match result.failure {
        Some(PostFailure::Validation) => StatusCode::BAD_REQUEST,
        Some(PostFailure::Remote) | Some(PostFailure::Transport) => StatusCode::BAD_GATEWAY,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn post_failure(result: SlackPostResult) -> ApiError {
    let status = post_failure_status(&result);
    ApiError::new(
        status,
        result.error.unwrap_or_else(|| "Failed to post to Slack".to_string()),
    )
}

/// `GET /api/calendar/product-jams`: the weekly buckets as JSON
pub async fn product_jams(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, ApiError> {
    let now = state.digest.now();
    let events = state
        .digest
        .collect(state.calendar.as_ref(), &session.claims.access_token, &now)
        .await?;

    // Buckets borrow `events`, so serialize before returning
    Ok(Json(state.digest.buckets(&events, &now)).into_response())
}

/// `POST /api/slack/post-product-jams`: post the digest with an optional channel override
pub async fn post_product_jams(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !state.slack.config().is_configured() {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Slack webhook URL not configured",
        ));
    }

    let session_key = session.claims.sub.as_str();
    let reservation = match state.cooldown.try_begin(session_key) {
        Ok(reservation) => reservation,
        Err(remaining) => {
            warn!("Post from {} rejected, {:?} of cooldown left", session_key, remaining);
            return Err(ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Please wait a few seconds before posting again",
            ));
        }
    };

    // A missing or malformed body just means no override
    let request: PostRequest = serde_json::from_slice(&body).unwrap_or_default();

    let result = post_digest(&state, &session.claims.access_token, request.channel.as_deref()).await;
    if result.is_err() {
        // Only successful posts start the cooldown
        state.cooldown.release(session_key, reservation);
    } else {
        info!("{} posted the digest to Slack", session_key);
    }
    result
}

async fn post_digest(
    state: &AppState,
    access_token: &str,
    channel: Option<&str>,
) -> Result<Response, ApiError> {
    let now = state.digest.now();
    let events = state
        .digest
        .collect(state.calendar.as_ref(), access_token, &now)
        .await?;
    let message = state.digest.message(&events, &now);

    let result = state.slack.post_configured(&message, channel).await;
    if !result.success {
        return Err(post_failure(result));
    }

    Ok(Json(result).into_response())
}

/// `GET /api/slack/settings`: what is configured, with the webhook masked
pub async fn get_slack_settings(State(state): State<AppState>) -> impl IntoResponse {
    let slack = state.slack.config();
    Json(json!({
        "configured": slack.is_configured(),
        "webhookUrl": slack.webhook_url.as_deref().map(mask_webhook_url),
        "defaultChannel": slack.default_channel,
    }))
}

/// `POST /api/slack/settings`: check a candidate webhook by sending a test message
pub async fn test_slack_settings(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: WebhookTestRequest = serde_json::from_slice(&body).unwrap_or_default();

    let Some(webhook_url) = request.webhook_url.filter(|u| !u.trim().is_empty()) else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Webhook URL is required"));
    };
    let webhook_url = webhook_url.trim();

    if !state.slack.policy().is_valid(webhook_url) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid Slack webhook URL format. Must be https://hooks.slack.com/services/...",
        ));
    }

    let result = state.slack.test_connection(webhook_url).await;
    if !result.success {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!(
                "Connection test failed: {}",
                result.error.unwrap_or_default()
            ),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Connection test successful! Update your .env file with this webhook URL.",
    }))
    .into_response())
}

/// `GET /api/cron/post-product-jams`: scheduled digest, authorized by the cron secret
pub async fn cron_post_product_jams(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(cron_secret) = state.config.cron_secret.as_deref() else {
        error!("CRON_SECRET not configured");
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Cron secret not configured",
        ));
    };

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == cron_secret);
    if !authorized {
        error!("Unauthorized cron request");
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    if !state.slack.config().is_configured() {
        error!("SLACK_WEBHOOK_URL not configured");
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Slack webhook URL not configured",
        ));
    }

    let Some(refresh_token) = state.config.google_refresh_token.as_deref() else {
        error!("GOOGLE_REFRESH_TOKEN not configured");
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Google refresh token not configured",
        ));
    };

    let access_token = state.tokens.refresh_access_token(refresh_token).await?;

    let now = state.digest.now();
    let events = state
        .digest
        .collect(state.calendar.as_ref(), &access_token, &now)
        .await?;
    let message = state.digest.message(&events, &now);

    let result = state.slack.post_configured(&message, None).await;
    if !result.success {
        error!("Failed to post to Slack: {:?}", result.error);
        return Err(post_failure(result));
    }

    info!("Successfully posted Product Jams to Slack");
    Ok(Json(json!({
        "success": true,
        "message": "Successfully posted Product Jams to Slack",
        "eventsCount": events.len(),
    }))
    .into_response())
}
