use super::webhook::WebhookPolicy;
use crate::config::SlackConfig;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

/// Longest message Slack accepts, in characters
pub const MAX_MESSAGE_CHARS: usize = 40_000;

/// Message sent when checking a webhook URL
pub const TEST_CONNECTION_MESSAGE: &str =
    ":white_check_mark: *Test Connection Successful*\n\nYour Chief of Staff app is connected to Slack!";

/// JSON body of an incoming webhook call
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<&'a str>,
}

/// Why a post did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFailure {
    /// Rejected before any request was made
    Validation,
    /// Slack answered with a non-success status
    Remote,
    /// The request itself failed
    Transport,
}

/// Outcome of a webhook post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackPostResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub failure: Option<PostFailure>,
}

impl SlackPostResult {
    pub fn posted(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
            failure: None,
        }
    }

    pub fn failed(failure: PostFailure, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            failure: Some(failure),
        }
    }
}

/// Posts messages to Slack incoming webhooks
#[derive(Debug, Clone)]
pub struct SlackPoster {
    client: Client,
    policy: WebhookPolicy,
    config: SlackConfig,
}

impl SlackPoster {
    /// Create a poster for real Slack webhooks
    pub fn new(config: SlackConfig) -> Self {
        Self::with_policy(config, WebhookPolicy::slack())
    }

    /// Create a poster that accepts URLs matching `policy`
    pub fn with_policy(config: SlackConfig, policy: WebhookPolicy) -> Self {
        Self {
            client: Client::new(),
            policy,
            config,
        }
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    pub fn policy(&self) -> &WebhookPolicy {
        &self.policy
    }

    /// Post `text` to `url`, optionally overriding the webhook's channel.
    ///
    /// Makes at most one request and never retries.
    pub async fn post_message(&self, url: &str, text: &str, channel: Option<&str>) -> SlackPostResult {
        if !self.policy.is_valid(url) {
            warn!("Refusing to post to a malformed webhook URL");
            return SlackPostResult::failed(PostFailure::Validation, "Invalid webhook URL format");
        }

        if text.chars().count() > MAX_MESSAGE_CHARS {
            warn!("Refusing to post a message longer than {} characters", MAX_MESSAGE_CHARS);
            return SlackPostResult::failed(
                PostFailure::Validation,
                "Message exceeds Slack's 40,000 character limit",
            );
        }

        let payload = SlackMessage { text, channel };

        let response = match self.client.post(url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to reach Slack webhook: {}", e);
                return SlackPostResult::failed(PostFailure::Transport, e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            error!("Slack webhook answered with HTTP {}", status.as_u16());
            return SlackPostResult::failed(
                PostFailure::Remote,
                format!("Slack API error: {} - {}", status.as_u16(), error_body),
            );
        }

        info!("Posted {} characters to Slack", text.chars().count());
        SlackPostResult::posted("Successfully posted to Slack")
    }

    /// Post to the configured webhook, using the configured default channel unless overridden
    pub async fn post_configured(&self, text: &str, channel_override: Option<&str>) -> SlackPostResult {
        let Some(url) = self.config.webhook_url.as_deref() else {
            return SlackPostResult::failed(
                PostFailure::Validation,
                "Slack webhook URL not configured",
            );
        };

        let channel = channel_override
            .filter(|c| !c.trim().is_empty())
            .or(self.config.default_channel.as_deref());

        self.post_message(url, text, channel).await
    }

    /// Send a fixed test message to `url`
    pub async fn test_connection(&self, url: &str) -> SlackPostResult {
        self.post_message(url, TEST_CONNECTION_MESSAGE, None).await
    }
}
