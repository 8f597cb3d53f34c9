//! Human-readable relative times ("3 minutes ago") for notification emails.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 12 * MONTH;
const LONG_TIME: i64 = 37 * YEAR;

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Describes `then` relative to `now`, e.g. `"now"`, `"2 hours ago"` or
/// `"1 day from now"`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then).num_seconds();
    let (secs, suffix) = if delta >= 0 {
        (delta, "ago")
    } else {
        (-delta, "from now")
    };

    let amount = match secs {
        0 => return "now".to_string(),
        s if s < MINUTE => plural(s, "second"),
        s if s < HOUR => plural(s / MINUTE, "minute"),
        s if s < DAY => plural(s / HOUR, "hour"),
        s if s < WEEK => plural(s / DAY, "day"),
        s if s < MONTH => plural(s / WEEK, "week"),
        s if s < YEAR => plural(s / MONTH, "month"),
        s if s < LONG_TIME => plural(s / YEAR, "year"),
        _ => "a long while".to_string(),
    };
    format!("{} {}", amount, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn scales_with_distance() {
        let now = Utc::now();
        let ago = |d: Duration| relative_time(now - d, now);

        assert_eq!(ago(Duration::zero()), "now");
        assert_eq!(ago(Duration::seconds(1)), "1 second ago");
        assert_eq!(ago(Duration::seconds(45)), "45 seconds ago");
        assert_eq!(ago(Duration::minutes(3)), "3 minutes ago");
        assert_eq!(ago(Duration::hours(1)), "1 hour ago");
        assert_eq!(ago(Duration::days(2)), "2 days ago");
        assert_eq!(ago(Duration::days(15)), "2 weeks ago");
        assert_eq!(ago(Duration::days(95)), "3 months ago");
        assert_eq!(ago(Duration::days(800)), "2 years ago");
        assert_eq!(ago(Duration::days(365 * 40)), "a long while ago");
    }

    #[test]
    fn future_times_read_from_now() {
        let now = Utc::now();
        assert_eq!(relative_time(now + Duration::minutes(5), now), "5 minutes from now");
    }
}
