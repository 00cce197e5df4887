use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Unauthorized: {0}")]
    #[diagnostic(code(chief_of_staff::unauthorized))]
    Unauthorized(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(chief_of_staff::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(chief_of_staff::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(chief_of_staff::google_calendar))]
    GoogleCalendar(String),

    #[error("Google OAuth error: {0}")]
    #[diagnostic(code(chief_of_staff::google_oauth))]
    GoogleOAuth(String),

    #[error("Template error: {0}")]
    #[diagnostic(code(chief_of_staff::template))]
    Template(#[from] askama::Error),

    #[error(transparent)]
    #[diagnostic(code(chief_of_staff::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(chief_of_staff::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(chief_of_staff::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create Google OAuth errors
pub fn google_oauth_error(message: &str) -> Error {
    Error::GoogleOAuth(message.to_string())
}

/// Helper to create authorization errors
pub fn unauthorized_error(message: &str) -> Error {
    Error::Unauthorized(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
