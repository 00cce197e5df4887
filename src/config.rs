use crate::components::slack::mask_webhook_url;
use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default location of the optional digest settings file
pub const DEFAULT_DIGEST_CONFIG_PATH: &str = "config/digest.toml";

/// Largest accepted `week_count`
pub const MAX_WEEK_COUNT: u32 = 52;

/// Default redirect URL registered with Google for the login callback
pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000/auth/callback";

/// Slack webhook configuration
#[derive(Clone, Default)]
pub struct SlackConfig {
    /// Incoming webhook URL, if one has been configured
    pub webhook_url: Option<String>,
    /// Channel used when the caller does not override it
    pub default_channel: Option<String>,
}

impl SlackConfig {
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("webhook_url", &self.webhook_url.as_deref().map(mask_webhook_url))
            .field("default_channel", &self.default_channel)
            .finish()
    }
}

/// Which events end up in the weekly digest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DigestSettings {
    /// Free-text query sent to the calendar search API
    pub search_query: String,
    /// Events whose title contains this keyword are left out
    pub exclude_keyword: Option<String>,
    /// Number of weeks shown, starting from the current one
    pub week_count: u32,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            search_query: "Product Jam".to_string(),
            exclude_keyword: Some("Enrollment".to_string()),
            week_count: 6,
        }
    }
}

impl DigestSettings {
    /// Load digest settings from a TOML file, falling back to defaults when it does not exist
    pub fn load_file(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: DigestSettings = toml::from_str(&content)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the digest cannot work with
    pub fn validate(&self) -> AppResult<()> {
        if !(1..=MAX_WEEK_COUNT).contains(&self.week_count) {
            return Err(config_error(&format!(
                "week_count must be between 1 and {}, got {}",
                MAX_WEEK_COUNT, self.week_count
            )));
        }
        Ok(())
    }
}

/// Main configuration structure for the app
#[derive(Clone)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Google Calendar ID to search
    pub google_calendar_id: String,
    /// Redirect URL for the OAuth login callback
    pub google_redirect_url: String,
    /// Long-lived refresh token used by the cron endpoint
    pub google_refresh_token: Option<String>,
    /// Secret used to sign session cookies
    pub session_secret: String,
    /// Bearer secret expected by the cron endpoint
    pub cron_secret: Option<String>,
    /// Slack webhook settings
    pub slack: SlackConfig,
    /// Digest query settings
    pub digest: DigestSettings,
    /// Timezone for week boundaries and display
    pub timezone: Tz,
    /// Address to bind the web server to
    pub host: String,
    /// Port to bind the web server to
    pub port: u16,
    /// Minimum seconds between manual Slack posts from one session
    pub post_cooldown_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("google_client_id", &self.google_client_id)
            .field("google_client_secret", &"<redacted>")
            .field("google_calendar_id", &self.google_calendar_id)
            .field("google_redirect_url", &self.google_redirect_url)
            .field("google_refresh_token", &self.google_refresh_token.as_ref().map(|_| "<redacted>"))
            .field("session_secret", &"<redacted>")
            .field("cron_secret", &self.cron_secret.as_ref().map(|_| "<redacted>"))
            .field("slack", &self.slack)
            .field("digest", &self.digest)
            .field("timezone", &self.timezone.name())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("post_cooldown_secs", &self.post_cooldown_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment and the digest settings file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;

        let digest_path = env::var("DIGEST_CONFIG")
            .unwrap_or_else(|_| DEFAULT_DIGEST_CONFIG_PATH.to_string());
        config.digest = DigestSettings::load_file(Path::new(&digest_path))?;

        Ok(config)
    }

    /// Build configuration from a variable lookup, using default digest settings
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| env_error(key));
        let optional = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let session_secret = required("SESSION_SECRET")?;

        let google_calendar_id =
            optional("GOOGLE_CALENDAR_ID").unwrap_or_else(|| "primary".to_string());
        let google_redirect_url =
            optional("GOOGLE_REDIRECT_URL").unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string());

        let timezone_name = optional("TIMEZONE").unwrap_or_else(|| "UTC".to_string());
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| config_error(&format!("Invalid TIMEZONE: {}", timezone_name)))?;

        let port = match optional("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid PORT: {}", p)))?,
            None => 3000,
        };

        let post_cooldown_secs = match optional("POST_COOLDOWN_SECS") {
            Some(s) => s
                .parse::<u64>()
                .map_err(|_| config_error(&format!("Invalid POST_COOLDOWN_SECS: {}", s)))?,
            None => 5,
        };

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            google_redirect_url,
            google_refresh_token: optional("GOOGLE_REFRESH_TOKEN"),
            session_secret,
            cron_secret: optional("CRON_SECRET"),
            slack: SlackConfig {
                webhook_url: optional("SLACK_WEBHOOK_URL"),
                default_channel: optional("SLACK_DEFAULT_CHANNEL"),
            },
            digest: DigestSettings::default(),
            timezone,
            host: optional("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            post_cooldown_secs,
        })
    }
}
