mod common;

use chief_of_staff::components::google_calendar::{
    EventQuery, EventSource, GoogleCalendarClient, TokenClient,
};
use chief_of_staff::error::Error;
use chrono::{TimeZone, Utc};
use mockito::Matcher;
use serde_json::json;

fn query() -> EventQuery {
    EventQuery::new("primary").search("Product Jam").between(
        Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 2, 19, 12, 0, 0).unwrap(),
    )
}

/// Events come back parsed and in the order the API returned them
#[tokio::test]
async fn test_list_events() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/calendars/primary/events")
        .match_header("authorization", "Bearer ya29.test")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "Product Jam".into()),
            Matcher::UrlEncoded("timeMin".into(), "2025-01-08T12:00:00.000Z".into()),
            Matcher::UrlEncoded("timeMax".into(), "2025-02-19T12:00:00.000Z".into()),
            Matcher::UrlEncoded("singleEvents".into(), "true".into()),
            Matcher::UrlEncoded("orderBy".into(), "startTime".into()),
            Matcher::UrlEncoded("maxResults".into(), "100".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "kind": "calendar#events",
                "items": [
                    {
                        "id": "evt1",
                        "summary": "Product Jam: Search",
                        "start": { "dateTime": "2025-01-09T10:00:00-05:00", "timeZone": "America/New_York" },
                        "end": { "dateTime": "2025-01-09T11:00:00-05:00" },
                        "location": "Room 4",
                        "htmlLink": "https://www.google.com/calendar/event?eid=evt1"
                    },
                    {
                        "id": "evt2",
                        "summary": "Product Jam: Offsite",
                        "start": { "date": "2025-01-20" },
                        "end": { "date": "2025-01-21" }
                    },
                    {
                        "id": "evt3",
                        "start": { "date": "2025-01-22" },
                        "end": { "date": "2025-01-23" }
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GoogleCalendarClient::with_api_base(&server.url());
    let events = client.list_events("ya29.test", &query()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].id, "evt1");
    assert_eq!(events[0].location.as_deref(), Some("Room 4"));
    assert_eq!(events[0].start.date_time.as_deref(), Some("2025-01-09T10:00:00-05:00"));
    assert_eq!(events[1].start.date.as_deref(), Some("2025-01-20"));
    assert!(events[1].html_link.is_none());
    // Missing summary becomes an empty title
    assert_eq!(events[2].summary, "");
}

/// A response without items is an empty calendar, not an error
#[tokio::test]
async fn test_list_events_without_items() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"kind":"calendar#events"}"#)
        .create_async()
        .await;

    let client = GoogleCalendarClient::with_api_base(&server.url());
    let events = client.list_events("token", &query()).await.unwrap();
    assert!(events.is_empty());
}

/// A rejected token is an authorization failure
#[tokio::test]
async fn test_list_events_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
        .create_async()
        .await;

    let client = GoogleCalendarClient::with_api_base(&server.url());
    let err = client.list_events("expired", &query()).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

/// Server errors are reported with status and body, once
#[tokio::test]
async fn test_list_events_server_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("backend unavailable")
        .expect(1)
        .create_async()
        .await;

    let client = GoogleCalendarClient::with_api_base(&server.url());
    let err = client.list_events("token", &query()).await.unwrap_err();

    mock.assert_async().await;
    match err {
        Error::GoogleCalendar(message) => {
            assert!(message.contains("503"));
            assert!(message.contains("backend unavailable"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_refresh_access_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "1//refresh".into()),
            Matcher::UrlEncoded("client_id".into(), "client-id".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.fresh","expires_in":3599,"token_type":"Bearer"}"#)
        .create_async()
        .await;

    let client = TokenClient::new("client-id", "client-secret", "http://localhost:3000/auth/callback")
        .with_endpoints(&format!("{}/token", server.url()), &format!("{}/userinfo", server.url()));
    let token = client.refresh_access_token("1//refresh").await.unwrap();

    mock.assert_async().await;
    assert_eq!(token, "ya29.fresh");
}

#[tokio::test]
async fn test_refresh_with_revoked_token() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#)
        .create_async()
        .await;

    let client = TokenClient::new("client-id", "client-secret", "http://localhost")
        .with_endpoints(&format!("{}/token", server.url()), &format!("{}/userinfo", server.url()));
    let err = client.refresh_access_token("revoked").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[tokio::test]
async fn test_exchange_code_and_user_info() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded("code".into(), "auth-code".into()))
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.new","refresh_token":"1//new","expires_in":3599}"#)
        .create_async()
        .await;
    let _userinfo = server
        .mock("GET", "/userinfo")
        .match_header("authorization", "Bearer ya29.new")
        .with_status(200)
        .with_body(r#"{"sub":"42","email":"pm@example.com","name":"Pat"}"#)
        .create_async()
        .await;

    let client = TokenClient::new("client-id", "client-secret", "http://localhost")
        .with_endpoints(&format!("{}/token", server.url()), &format!("{}/userinfo", server.url()));

    let token = client.exchange_code("auth-code").await.unwrap();
    assert_eq!(token.refresh_token.as_deref(), Some("1//new"));

    let user = client.fetch_user_info(&token.access_token).await.unwrap();
    assert_eq!(user.sub.as_deref(), Some("42"));
    assert_eq!(user.name.as_deref(), Some("Pat"));
}
