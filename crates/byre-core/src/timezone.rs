use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<(), CoreError> {
    Tz::from_str(timezone)
        .map(|_| ())
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// The farm's civil date right now. Unknown zone names fall back to UTC so
/// date math never fails on a bad config value.
pub fn today_in(timezone: &str) -> NaiveDate {
    date_in(timezone, Utc::now())
}

/// Civil date of `at_time` in the named timezone, falling back to UTC.
pub fn date_in(timezone: &str, at_time: DateTime<Utc>) -> NaiveDate {
    match Tz::from_str(timezone) {
        Ok(tz) => at_time.with_timezone(&tz).date_naive(),
        Err(_) => at_time.date_naive(),
    }
}

/// Format an instant for display in the given timezone.
pub fn format_with_timezone(
    datetime: DateTime<Utc>,
    timezone: &str,
    format: &str,
) -> Result<String, CoreError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))?;

    let local_dt = datetime.with_timezone(&tz);
    Ok(local_dt.format(format).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("Europe/Berlin").is_ok());
        assert!(validate_timezone("Invalid/Timezone").is_err());
    }

    #[test]
    fn date_shifts_across_the_local_midnight() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap();
        assert_eq!(
            date_in("America/New_York", instant),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );
        assert_eq!(
            date_in("UTC", instant),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn unknown_zones_fall_back_to_utc() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap();
        assert_eq!(
            date_in("Not/AZone", instant),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_format_with_timezone() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let formatted = format_with_timezone(instant, "UTC", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(formatted, "2024-01-15 12:00");
    }
}
