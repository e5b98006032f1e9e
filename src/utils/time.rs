use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// RFC 3339 with milliseconds in UTC, e.g. `2024-03-01T09:30:00.000Z`
pub fn to_iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a date as `March 1, 2024`
///
/// Accepts RFC 3339 timestamps (converted into `tz`), naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps (taken as already in `tz`) and plain `YYYY-MM-DD` dates.
pub fn format_date(date_str: &str, tz: Tz) -> Option<String> {
    let date_str = date_str.trim();

    let date = if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        dt.with_timezone(&tz).date_naive()
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%.f") {
        tz.from_local_datetime(&naive).earliest()?.date_naive()
    } else {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?
    };

    Some(date.format("%B %-d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date("2024-03-01", chrono_tz::UTC).as_deref(),
            Some("March 1, 2024")
        );
        assert_eq!(
            format_date("2024-12-25T10:15:00.000Z", chrono_tz::UTC).as_deref(),
            Some("December 25, 2024")
        );
        // Python-style naive timestamps keep their calendar date
        assert_eq!(
            format_date("2024-07-04T23:59:59.123456", chrono_tz::Asia::Kolkata).as_deref(),
            Some("July 4, 2024")
        );

        // Late UTC evening is already the next day in India
        assert_eq!(
            format_date("2024-03-01T20:00:00Z", chrono_tz::Asia::Kolkata).as_deref(),
            Some("March 2, 2024")
        );

        // Invalid input
        assert_eq!(format_date("yesterday", chrono_tz::UTC), None);
        assert_eq!(format_date("2024-13-01", chrono_tz::UTC), None);
    }

    #[test]
    fn test_to_iso_shape() {
        let fixed = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(to_iso(fixed), "2024-03-01T09:30:00.000Z");

        let now = to_iso(Utc::now());
        assert!(now.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
        // Millisecond precision: `.mmmZ`
        assert_eq!(now.split('.').nth(1).map(str::len), Some(4));
    }
}
