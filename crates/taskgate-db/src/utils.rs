//! Shared utility functions

use chrono::{DateTime, Utc};

/// Parse an RFC3339 timestamp column, falling back to the current time
///
/// Timestamps are written by this crate as RFC3339 text, so the fallback only
/// triggers on rows edited by hand.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_or_now() {
        let parsed = parse_datetime_or_now("2024-01-01T12:00:00Z");
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        let offset = parse_datetime_or_now("2024-01-01T14:00:00+02:00");
        assert_eq!(offset.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        let now_before = Utc::now();
        let parsed = parse_datetime_or_now("invalid");
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }
}
