use crate::components::google_calendar::time::display_time;
use crate::components::weekly::WeekBucket;
use chrono_tz::Tz;

/// First line of the digest, followed by a blank line.
///
/// The title always reads "Next 6 Weeks", whatever `week_count` is configured.
pub const DIGEST_HEADER: &str = ":calendar: *Product Jams - Next 6 Weeks*\n\n";

/// Closing lines of the digest
pub const DIGEST_FOOTER: &str = "\n\n---\n_Posted by Chief of Staff_";

/// Render weekly buckets as a Slack message.
///
/// Weeks without events are left out. Timed events are shown in `tz`.
pub fn format_for_slack(buckets: &[WeekBucket<'_>], tz: &Tz) -> String {
    let body = buckets
        .iter()
        .filter(|bucket| !bucket.is_empty())
        .map(|bucket| {
            let lines: Vec<String> = bucket
                .events
                .iter()
                .map(|event| format!("• {} - {}", event.summary, display_time(event, tz)))
                .collect();
            format!("*{}*\n{}", bucket.label, lines.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}{}{}", DIGEST_HEADER, body, DIGEST_FOOTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::{CalendarEvent, EventDateTime};
    use crate::components::weekly::bucket_by_week;
    use chrono::TimeZone;
    use chrono_tz::UTC;

    fn event(id: &str, summary: &str, start: EventDateTime) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: summary.to_string(),
            start,
            ..Default::default()
        }
    }

    #[test]
    fn test_all_empty_is_header_and_footer() {
        let now = UTC.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap();
        let buckets = bucket_by_week(&[], 6, &now);
        assert_eq!(
            format_for_slack(&buckets, &UTC),
            format!("{}{}", DIGEST_HEADER, DIGEST_FOOTER)
        );
    }

    #[test]
    fn test_no_buckets_is_header_and_footer() {
        assert_eq!(
            format_for_slack(&[], &UTC),
            ":calendar: *Product Jams - Next 6 Weeks*\n\n\n\n---\n_Posted by Chief of Staff_"
        );
    }

    #[test]
    fn test_header_ignores_week_count() {
        let now = UTC.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap();
        let events = vec![event("1", "Product Jam: Search", EventDateTime::all_day("2025-01-09"))];
        let buckets = bucket_by_week(&events, 2, &now);

        let message = format_for_slack(&buckets, &UTC);
        assert!(message.starts_with(":calendar: *Product Jams - Next 6 Weeks*\n\n*Week of Jan 5-Jan 11, 2025*"));
    }

    #[test]
    fn test_formats_non_empty_weeks() {
        let now = UTC.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap();
        let events = vec![
            event("1", "Product Jam: Search", EventDateTime::timestamp("2025-01-09T15:00:00Z")),
            event("2", "Product Jam: Billing", EventDateTime::all_day("2025-01-10")),
            event("3", "Product Jam: Mobile", EventDateTime::timestamp("2025-01-21T10:00:00Z")),
        ];
        let buckets = bucket_by_week(&events, 3, &now);

        let expected = concat!(
            ":calendar: *Product Jams - Next 6 Weeks*\n\n",
            "*Week of Jan 5-Jan 11, 2025*\n",
            "• Product Jam: Search - Jan 9, Thu\n",
            "• Product Jam: Billing - 2025-01-10\n",
            "\n",
            "*Week of Jan 19-Jan 25, 2025*\n",
            "• Product Jam: Mobile - Jan 21, Tue",
            "\n\n---\n_Posted by Chief of Staff_"
        );
        assert_eq!(format_for_slack(&buckets, &UTC), expected);
    }
}
