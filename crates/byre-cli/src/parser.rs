use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parse a natural-language or ISO date relative to the farm's current day.
pub fn parse_natural_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let base = Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN));
    parse_date_string(input, base, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parse time strings like "9:00 AM", "14:30", "9pm", "noon", "midnight"
pub fn parse_time_string(time_str: &str) -> Result<NaiveTime> {
    let input = time_str.trim().to_lowercase();

    match input.as_str() {
        "noon" | "12pm" | "12:00pm" => return Ok(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()),
        "midnight" | "12am" | "12:00am" => return Ok(NaiveTime::MIN),
        _ => {}
    }

    let formats = [
        "%H:%M:%S",    // 14:30:00
        "%H:%M",       // 14:30
        "%I:%M:%S %p", // 9:00:00 AM
        "%I:%M %p",    // 9:00 AM
        "%I%p",        // 9AM, 9PM
        "%I %p",       // 9 AM, 9 PM
        "%H",          // 14 (hour only)
    ];

    for format in &formats {
        if let Ok(time) = NaiveTime::parse_from_str(time_str, format) {
            return Ok(time);
        }
    }
    for format in &formats {
        if let Ok(time) = NaiveTime::parse_from_str(&input, format) {
            return Ok(time);
        }
    }

    Err(anyhow::anyhow!(
        "Invalid time format: '{}'\n\nSupported formats:\n  • 24-hour: '14:30', '09:00'\n  • 12-hour: '2:30 PM', '9:00 AM'\n  • Compact: '2pm', '9am'\n  • Special: 'noon', 'midnight'",
        time_str
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("14:30", 14, 30)]
    #[case("09:00", 9, 0)]
    #[case("9:00 AM", 9, 0)]
    #[case("2:30 PM", 14, 30)]
    #[case("9pm", 21, 0)]
    #[case("noon", 12, 0)]
    #[case("midnight", 0, 0)]
    fn parses_common_time_formats(#[case] input: &str, #[case] hour: u32, #[case] minute: u32) {
        let parsed = parse_time_string(input).unwrap();
        assert_eq!(parsed, NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
    }

    #[test]
    fn rejects_nonsense_times() {
        assert!(parse_time_string("quarter past teatime").is_err());
    }

    #[test]
    fn dates_resolve_relative_to_the_given_day() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(parse_natural_date("today", today).unwrap(), today);
        assert_eq!(
            parse_natural_date("tomorrow", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
        assert_eq!(
            parse_natural_date("2024-04-01", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
    }

    #[test]
    fn unparseable_dates_error() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(parse_natural_date("the cows come home", today).is_err());
    }
}
