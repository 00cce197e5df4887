use chief_of_staff::components::google_calendar::TokenClient;
use chief_of_staff::config::Config;
use chief_of_staff::error::{other_error, AppResult, Error};
use url::Url;

/// Where Google redirects after consent while this tool is running
const LOCAL_REDIRECT: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> miette::Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> AppResult<()> {
    // Load configuration
    let config = Config::load()?;

    let token_client = TokenClient::new(
        &config.google_client_id,
        &config.google_client_secret,
        LOCAL_REDIRECT,
    );

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = token_client.authorization_url(&state);

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(&auth_url).is_err() {
        println!("Could not open a browser. Visit this URL instead:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("127.0.0.1:8080")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    let request = server.recv()?;
    let callback = Url::parse(LOCAL_REDIRECT)
        .and_then(|base| base.join(request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        let _ = request.respond(tiny_http::Response::from_string("State mismatch, please retry."));
        return Err(other_error("State in callback did not match"));
    }

    let code = param("code").ok_or_else(|| other_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let token = token_client.exchange_code(&code).await?;

    let _ = request.respond(tiny_http::Response::from_string(
        "Authorization successful! You can close this window.",
    ));

    match token.refresh_token {
        Some(refresh_token) => {
            println!("Add this to your .env file:\n\nGOOGLE_REFRESH_TOKEN={}", refresh_token);
            Ok(())
        }
        None => Err(Error::GoogleOAuth(
            "Google did not return a refresh token; revoke the app's access and try again".to_string(),
        )),
    }
}
