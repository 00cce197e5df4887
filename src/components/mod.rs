// Export components
pub mod digest;
pub mod google_calendar;
pub mod slack;
pub mod weekly;

// Re-export the pieces most callers need
pub use digest::ProductJamDigest;
pub use google_calendar::{CalendarEvent, GoogleCalendarClient};
pub use slack::SlackPoster;
pub use weekly::{bucket_by_week, WeekBucket};
