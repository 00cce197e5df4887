use crate::config::Config;
use crate::error::{google_oauth_error, unauthorized_error, AppResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, error};

/// Google's OAuth consent page
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's OAuth token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// OpenID Connect user info endpoint
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
/// Scopes requested at login
pub const SCOPES: &str = "openid email profile https://www.googleapis.com/auth/calendar.readonly";

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Basic profile of the signed-in user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// OAuth client for Google sign-in and token refresh
#[derive(Clone)]
pub struct TokenClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    token_url: String,
    userinfo_url: String,
}

impl fmt::Debug for TokenClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClient")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl TokenClient {
    pub fn new(client_id: &str, client_secret: &str, redirect_url: &str) -> Self {
        Self {
            client: Client::new(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_url: redirect_url.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.google_client_id,
            &config.google_client_secret,
            &config.google_redirect_url,
        )
    }

    /// Use other token and user info endpoints, e.g. a mock server
    pub fn with_endpoints(mut self, token_url: &str, userinfo_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self.userinfo_url = userinfo_url.to_string();
        self
    }

    /// Consent page URL; `state` is echoed back to the redirect URL
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&access_type=offline&prompt=consent&scope={}&state={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> AppResult<TokenResponse> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];
        self.request_token(&params, "exchange authorization code").await
    }

    /// Get a fresh access token from a refresh token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<String> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let token = self.request_token(&params, "refresh token").await?;
        Ok(token.access_token)
    }

    async fn request_token(&self, params: &[(&str, &str)], action: &str) -> AppResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| google_oauth_error(&format!("Failed to {}: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            error!("Failed to {}: HTTP {}", action, status);

            // invalid_grant and friends mean the credential itself is no good
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                return Err(unauthorized_error(&format!("Failed to {}: {}", action, error_body)));
            }
            return Err(google_oauth_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| google_oauth_error(&format!("Failed to parse token response: {}", e)))?;

        debug!("Token request succeeded ({})", action);
        Ok(token)
    }

    /// Look up the signed-in user's profile
    pub async fn fetch_user_info(&self, access_token: &str) -> AppResult<UserInfo> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_oauth_error(&format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            return Err(unauthorized_error(&format!(
                "User info request failed: HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_oauth_error(&format!("Failed to parse user info: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let client = TokenClient::new("my-client", "secret", "http://localhost:3000/auth/callback");
        let url = url::Url::parse(&client.authorization_url("abc-123")).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let pairs: std::collections::HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "my-client");
        assert_eq!(pairs["redirect_uri"], "http://localhost:3000/auth/callback");
        assert_eq!(pairs["state"], "abc-123");
        assert_eq!(pairs["access_type"], "offline");
        assert!(pairs["scope"].contains("calendar.readonly"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = TokenClient::new("my-client", "very-secret", "http://localhost");
        assert!(!format!("{:?}", client).contains("very-secret"));
    }
}
