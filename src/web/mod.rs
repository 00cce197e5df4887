//! Web interface: pages, JSON API and Google sign-in.

pub mod api;
pub mod auth;
pub mod cooldown;
pub mod error;
pub mod handlers;
pub mod templates;

use crate::components::digest::ProductJamDigest;
use crate::components::google_calendar::{EventSource, GoogleCalendarClient, TokenClient};
use crate::components::slack::SlackPoster;
use crate::config::Config;
use auth::{SessionConfig, SessionService};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use cooldown::PostCooldown;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Longest session lifetime; Google access tokens usually expire sooner
pub const SESSION_LIFETIME_MINUTES: i64 = 60 * 24;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Calendar search backend
    pub calendar: Arc<dyn EventSource>,
    /// Google OAuth client
    pub tokens: TokenClient,
    /// Slack webhook poster
    pub slack: SlackPoster,
    /// Session token service
    pub sessions: Arc<SessionService>,
    /// Per-session throttle for manual posts
    pub cooldown: Arc<PostCooldown>,
    /// Digest query and formatting
    pub digest: ProductJamDigest,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = SessionService::new(SessionConfig {
            secret: config.session_secret.clone(),
            lifetime_minutes: SESSION_LIFETIME_MINUTES,
            secure_cookies: config.google_redirect_url.starts_with("https://"),
        });

        Self {
            calendar: Arc::new(GoogleCalendarClient::new()),
            tokens: TokenClient::from_config(&config),
            slack: SlackPoster::new(config.slack.clone()),
            sessions: Arc::new(sessions),
            cooldown: Arc::new(PostCooldown::new(Duration::from_secs(config.post_cooldown_secs))),
            digest: ProductJamDigest::from_config(&config),
            config: Arc::new(config),
        }
    }

    /// Replace the calendar backend
    pub fn with_event_source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.calendar = source;
        self
    }

    /// Replace the OAuth client
    pub fn with_token_client(mut self, tokens: TokenClient) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replace the Slack poster
    pub fn with_slack_poster(mut self, poster: SlackPoster) -> Self {
        self.slack = poster;
        self
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    // Everything registered before `route_layer` requires a session
    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/calendar/product-jams", get(handlers::product_jams_page))
        .route("/slack/settings", get(handlers::slack_settings_page))
        .route("/api/calendar/product-jams", get(api::product_jams))
        .route("/api/slack/post-product-jams", post(api::post_product_jams))
        .route(
            "/api/slack/settings",
            get(api::get_slack_settings).post(api::test_slack_settings),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ))
        .route("/auth/signin", get(handlers::signin_page))
        .route("/auth/google", get(auth::google_signin_handler))
        .route("/auth/callback", get(auth::callback_handler))
        .route("/auth/signout", post(auth::signout_handler))
        .route("/api/cron/post-product-jams", get(api::cron_post_product_jams))
        .route("/health", get(handlers::health_handler))
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
