use super::AppState;
use crate::components::google_calendar::{TokenResponse, UserInfo};
use crate::error::{other_error, AppResult};
use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cookie holding the signed session
pub const SESSION_COOKIE: &str = "session";
/// Cookie holding the OAuth state between sign-in and callback
pub const STATE_COOKIE: &str = "oauth_state";

/// How long the OAuth state cookie lives
const STATE_COOKIE_MINUTES: i64 = 10;

/// Error codes the sign-in page knows how to explain
pub const SIGNIN_ERRORS: [(&str, &str); 3] = [
    ("denied", "Sign-in was cancelled"),
    ("expired", "Your sign-in attempt expired, please try again"),
    ("failed", "Sign-in failed, please try again"),
];

/// Session claims stored in the cookie
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (Google user ID)
    pub sub: String,
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Google access token used for calendar calls
    pub access_token: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

impl SessionClaims {
    /// Name to greet the user with
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "there".to_string())
    }
}

/// Authenticated session, inserted into request extensions by [`require_session`]
#[derive(Debug, Clone)]
pub struct Session {
    pub claims: SessionClaims,
}

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret for signing/verifying session tokens
    pub secret: String,
    /// Longest session lifetime in minutes
    pub lifetime_minutes: i64,
    /// Mark cookies as Secure
    pub secure_cookies: bool,
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    /// No session cookie or bearer token
    MissingToken,
    /// Token failed validation or has expired
    InvalidToken,
}

/// Issues and validates session tokens
pub struct SessionService {
    config: Arc<SessionConfig>,
}

impl SessionService {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> Arc<SessionConfig> {
        self.config.clone()
    }

    /// Sign a session for `user`; returns the token and its lifetime in seconds.
    ///
    /// The session never outlives the Google access token it carries.
    pub fn issue(&self, user: &UserInfo, token: &TokenResponse) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let mut lifetime = Duration::minutes(self.config.lifetime_minutes);
        if let Some(expires_in) = token.expires_in {
            lifetime = lifetime.min(Duration::seconds(expires_in));
        }
        let exp = now + lifetime;

        let claims = SessionClaims {
            sub: user
                .sub
                .clone()
                .or_else(|| user.email.clone())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: user.name.clone(),
            email: user.email.clone(),
            access_token: token.access_token.clone(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let jwt = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| other_error(&format!("Failed to sign session: {}", e)))?;

        Ok((jwt, lifetime.num_seconds()))
    }

    /// Validate a session token
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Session validation error: {:?}", e);
            AuthError::InvalidToken
        })
    }
}

/// Find the session token in the cookie jar or the Authorization header
pub fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Ok(cookie.value().to_string());
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .ok_or(AuthError::InvalidToken)
}

/// Reject requests without a valid session.
///
/// Pages redirect to the sign-in page, API routes answer 401.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = extract_token(&jar, req.headers())
        .and_then(|token| state.sessions.validate_token(&token));

    match claims {
        Ok(claims) => {
            req.extensions_mut().insert(Session { claims });
            next.run(req).await
        }
        Err(e) => {
            debug!("Rejecting request to {}: {:?}", req.uri().path(), e);
            if req.uri().path().starts_with("/api/") {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
            } else {
                Redirect::to("/auth/signin").into_response()
            }
        }
    }
}

fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

fn signin_redirect(jar: CookieJar, code: &str) -> Response {
    (jar, Redirect::to(&format!("/auth/signin?error={}", code))).into_response()
}

/// Start the Google sign-in flow
pub async fn google_signin_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    let oauth_state = uuid::Uuid::new_v4().to_string();
    let secure = state.sessions.config().secure_cookies;

    let cookie = Cookie::build((STATE_COOKIE, oauth_state.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(STATE_COOKIE_MINUTES))
        .build();

    (
        jar.add(cookie),
        Redirect::to(&state.tokens.authorization_url(&oauth_state)),
    )
        .into_response()
}

/// Query parameters Google sends back to the callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Finish the Google sign-in flow and issue a session
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let expected_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(removal_cookie(STATE_COOKIE));

    if let Some(err) = params.error {
        warn!("Google sign-in returned an error: {}", err);
        return signin_redirect(jar, "denied");
    }

    let (Some(code), Some(returned_state)) = (params.code, params.state) else {
        warn!("Sign-in callback without code or state");
        return signin_redirect(jar, "failed");
    };

    if expected_state.as_deref() != Some(returned_state.as_str()) {
        warn!("Sign-in state did not match");
        return signin_redirect(jar, "expired");
    }

    let token = match state.tokens.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to exchange authorization code: {}", e);
            return signin_redirect(jar, "failed");
        }
    };

    let user = state
        .tokens
        .fetch_user_info(&token.access_token)
        .await
        .unwrap_or_else(|e| {
            warn!("Could not load user profile: {}", e);
            UserInfo::default()
        });

    match state.sessions.issue(&user, &token) {
        Ok((jwt, max_age)) => {
            info!(
                "User {} signed in",
                user.email.as_deref().unwrap_or("<unknown>")
            );
            let secure = state.sessions.config().secure_cookies;
            (jar.add(session_cookie(jwt, max_age, secure)), Redirect::to("/")).into_response()
        }
        Err(e) => {
            error!("Failed to issue session: {}", e);
            signin_redirect(jar, "failed")
        }
    }
}

/// Clear the session cookie
pub async fn signout_handler(jar: CookieJar) -> Response {
    (jar.remove(removal_cookie(SESSION_COOKIE)), Redirect::to("/auth/signin")).into_response()
}
