//! Google sign-in and calendar access.

mod client;
pub mod models;
pub mod time;
pub mod token;

pub use client::{EventQuery, EventSource, GoogleCalendarClient, DEFAULT_API_BASE, MAX_RESULTS};
pub use models::{CalendarEvent, EventDateTime};
pub use token::{TokenClient, TokenResponse, UserInfo};
