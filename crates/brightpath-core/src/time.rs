use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current instant in UTC.
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Format a timestamp as RFC 3339 for response payloads.
pub fn format_rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

/// Human-readable age of a timestamp, e.g. "12 minutes ago".
///
/// Months and years are approximate (30/365 days), matching what the forum
/// displays next to posts and comments.
pub fn time_since(created_at: OffsetDateTime) -> String {
    time_since_at(created_at, now_utc())
}

fn time_since_at(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - created_at).whole_seconds().max(0);
    if seconds < 60 {
        return format!("{seconds} seconds ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{days} days ago");
    }
    let months = days / 30;
    if months < 12 {
        return format!("{months} months ago");
    }
    let years = days / 365;
    format!("{years} years ago")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn seconds_and_minutes() {
        let now = now_utc();
        assert_eq!(time_since_at(now - Duration::seconds(5), now), "5 seconds ago");
        assert_eq!(time_since_at(now - Duration::minutes(3), now), "3 minutes ago");
    }

    #[test]
    fn hours_days_months_years() {
        let now = now_utc();
        assert_eq!(time_since_at(now - Duration::hours(7), now), "7 hours ago");
        assert_eq!(time_since_at(now - Duration::days(4), now), "4 days ago");
        assert_eq!(time_since_at(now - Duration::days(65), now), "2 months ago");
        assert_eq!(time_since_at(now - Duration::days(800), now), "2 years ago");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        let now = now_utc();
        assert_eq!(time_since_at(now + Duration::seconds(30), now), "0 seconds ago");
    }

    #[test]
    fn rfc3339_round_trip() {
        let now = now_utc();
        let s = format_rfc3339(now);
        let parsed = OffsetDateTime::parse(&s, &Rfc3339).unwrap();
        assert_eq!(parsed.unix_timestamp(), now.unix_timestamp());
    }
}
