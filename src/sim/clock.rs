//! Day-relative time arithmetic shared by the engine.
//!
//! Every engine component works on whole minutes of a single day. Instants
//! coming from callers (`NaiveTime`, `NaiveDateTime`, …) are truncated to the
//! minute that contains them.

use chrono::{NaiveTime, Timelike, Weekday};

/// Number of simulated minutes in a day (rows of the state matrix).
pub const MINUTES_PER_DAY: usize = 24 * 60;
/// Number of hourly tariff slots in a day.
pub const HOURS_PER_DAY: usize = 24;
/// Number of days in the tariff week.
pub const DAYS_PER_WEEK: usize = 7;
/// Minutes in one hourly tariff slot.
pub const MINUTES_PER_HOUR: usize = 60;

/// Returns the minute of the day (`0..MINUTES_PER_DAY`) containing `when`.
///
/// Seconds and sub-second parts are dropped.
pub fn minute_of_day(when: &impl Timelike) -> usize {
    when.hour() as usize * MINUTES_PER_HOUR + when.minute() as usize
}

/// Converts a minute of the day back to a time of day.
///
/// Values past the end of the day wrap around midnight.
pub fn time_of_minute(minute: usize) -> NaiveTime {
    let secs = (minute % MINUTES_PER_DAY) as u32 * 60;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or_default()
}

/// Index of `weekday` in the tariff week, Monday first.
pub fn day_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

/// Returns `true` for Monday through Friday.
pub fn is_weekday(weekday: Weekday) -> bool {
    day_index(weekday) < 5
}

fn parse_time_of_day(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M").or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
}

/// Serde adapter reading and writing a time of day as `"HH:MM"`.
///
/// `"HH:MM:SS"` is accepted on input.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw)
            .map_err(|e| D::Error::custom(format!("invalid time of day \"{raw}\": {e}")))
    }
}

/// Serde adapter for an optional `["HH:MM", "HH:MM"]` pair.
pub mod hhmm_range {
    use chrono::NaiveTime;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        range: &Option<(NaiveTime, NaiveTime)>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match range {
            Some((start, end)) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&start.format("%H:%M").to_string())?;
                seq.serialize_element(&end.format("%H:%M").to_string())?;
                seq.end()
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<(NaiveTime, NaiveTime)>, D::Error> {
        let raw: Option<[String; 2]> = Option::deserialize(deserializer)?;
        let Some([start, end]) = raw else {
            return Ok(None);
        };
        let parse = |s: &str| {
            super::parse_time_of_day(s)
                .map_err(|e| D::Error::custom(format!("invalid time of day \"{s}\": {e}")))
        };
        Ok(Some((parse(&start)?, parse(&end)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn minute_of_day_truncates_seconds() {
        let t = NaiveTime::from_hms_opt(9, 30, 59).unwrap();
        assert_eq!(minute_of_day(&t), 570);
    }

    #[test]
    fn minute_of_day_accepts_datetimes() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(minute_of_day(&dt), MINUTES_PER_DAY - 1);
    }

    #[test]
    fn time_of_minute_inverts_minute_of_day() {
        for minute in [0, 1, 59, 60, 540, 1080, MINUTES_PER_DAY - 1] {
            assert_eq!(minute_of_day(&time_of_minute(minute)), minute);
        }
    }

    #[test]
    fn time_of_minute_wraps_at_midnight() {
        assert_eq!(time_of_minute(MINUTES_PER_DAY), NaiveTime::default());
    }

    #[test]
    fn weekdays_are_monday_to_friday() {
        assert!(is_weekday(Weekday::Mon));
        assert!(is_weekday(Weekday::Fri));
        assert!(!is_weekday(Weekday::Sat));
        assert!(!is_weekday(Weekday::Sun));
        assert_eq!(day_index(Weekday::Sun), DAYS_PER_WEEK - 1);
    }

    #[test]
    fn parses_short_and_long_time_formats() {
        assert_eq!(
            parse_time_of_day("07:05").ok(),
            NaiveTime::from_hms_opt(7, 5, 0)
        );
        assert_eq!(
            parse_time_of_day("07:05:30").ok(),
            NaiveTime::from_hms_opt(7, 5, 30)
        );
        assert!(parse_time_of_day("7 o'clock").is_err());
    }
}
