use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use crate::models::StartTime;

#[derive(Debug, Error, PartialEq)]
pub enum TimeParseError {
    #[error("timestamp is empty")]
    Empty,
    #[error("expected a timestamp string, got {0}")]
    NotText(String),
    #[error("malformed ISO-8601 date-time: {0}")]
    Malformed(&'static str),
    #[error("invalid ISO-8601 date-time: {0}")]
    Invalid(#[from] chrono::ParseError),
}

/// Clock time of an event, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        // Timelike guarantees hour < 24 and minute < 60.
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Splits `HH[:MM[:SS[.f]]]` or `HH[MM[SS[.f]]]` into hour, minute and second.
fn clock_fields(text: &str) -> Result<[&str; 3], TimeParseError> {
    if !text.is_ascii() {
        return Err(TimeParseError::Malformed("non-ASCII time"));
    }
    let (whole, fraction) = match text.find(['.', ',']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };

    let groups: Vec<&str> = if whole.contains(':') {
        whole.split(':').collect()
    } else if whole.len() % 2 == 0 {
        (0..whole.len()).step_by(2).map(|at| &whole[at..at + 2]).collect()
    } else {
        return Err(TimeParseError::Malformed("odd number of time digits"));
    };

    if groups.is_empty() || groups.len() > 3 {
        return Err(TimeParseError::Malformed("expected hour, minute and second"));
    }
    if groups
        .iter()
        .any(|group| group.len() != 2 || !group.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(TimeParseError::Malformed("time fields must be two digits"));
    }
    if let Some(fraction) = fraction
        && (groups.len() != 3 || fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(TimeParseError::Malformed("fraction must follow seconds"));
    }

    Ok([
        groups[0],
        groups.get(1).copied().unwrap_or("00"),
        groups.get(2).copied().unwrap_or("00"),
    ])
}

/// Range-checks clock fields; chrono would read a second of `60` as a leap second.
fn checked_clock([hour, minute, second]: [&str; 3]) -> Result<NaiveTime, TimeParseError> {
    if second > "59" {
        return Err(TimeParseError::Malformed("second must be in 0..59"));
    }
    Ok(NaiveTime::parse_from_str(
        &format!("{hour}:{minute}:{second}"),
        "%H:%M:%S",
    )?)
}

fn checked_date(text: &str) -> Result<NaiveDate, TimeParseError> {
    let extended = match text.len() {
        10 => text.to_string(),
        8 if text.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{}-{}-{}", &text[..4], &text[4..6], &text[6..])
        }
        _ => return Err(TimeParseError::Malformed("date must be YYYY-MM-DD or YYYYMMDD")),
    };
    Ok(NaiveDate::parse_from_str(&extended, "%Y-%m-%d")?)
}

/// Parses an ISO-8601 date or date-time and returns its wall-clock time.
///
/// A trailing `Z` is read as `+00:00`. Timestamps carrying an offset keep the
/// clock time written in that offset; no conversion to another zone happens.
/// Extended (`2024-01-15T10:30`) and basic (`20240115T1030`) forms are
/// accepted, time fields may stop after the hour, and a bare date is midnight.
pub fn parse_time_of_day(raw: &str) -> Result<TimeOfDay, TimeParseError> {
    if raw.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let normalized = match raw.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    };

    let (date, time) = match normalized.find(['T', ' ']) {
        Some(at) => (&normalized[..at], Some(&normalized[at + 1..])),
        None => (normalized.as_str(), None),
    };
    checked_date(date)?;

    let Some(time) = time else {
        return Ok(TimeOfDay { hour: 0, minute: 0 });
    };
    let (clock, offset) = match time.find(['+', '-']) {
        Some(at) => (&time[..at], Some(&time[at + 1..])),
        None => (time, None),
    };
    if let Some(offset) = offset {
        checked_clock(clock_fields(offset)?)?;
    }

    Ok(checked_clock(clock_fields(clock)?)?.into())
}

/// Resolves a record's `startTime` to a time-of-day key.
///
/// Failures are reported on the diagnostic channel and yield `None`, so a
/// single bad record never aborts an aggregation pass.
pub fn extract_time_of_day(value: &StartTime) -> Option<TimeOfDay> {
    let result = match value {
        StartTime::Text(raw) => parse_time_of_day(raw),
        StartTime::Other(other) => Err(TimeParseError::NotText(other.to_string())),
    };

    match result {
        Ok(time) => Some(time),
        Err(err) => {
            let input = match value {
                StartTime::Text(raw) => raw.clone(),
                StartTime::Other(other) => other.to_string(),
            };
            warn!(input = %input, error = %err, "failed to parse start time");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    fn hm(hour: u32, minute: u32) -> TimeOfDay {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap().into()
    }

    /// In-memory sink for formatted log lines.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }

    #[test]
    fn test_parse_utc_with_millis() {
        assert_eq!(parse_time_of_day("2024-01-15T10:30:00.000Z").unwrap(), hm(10, 30));
        assert_eq!(
            parse_time_of_day("2024-01-15T10:30:00.000Z").unwrap().to_string(),
            "10:30"
        );
    }

    #[test]
    fn test_parse_offset_forms() {
        assert_eq!(parse_time_of_day("2024-01-15T12:00:00Z").unwrap(), hm(12, 0));
        assert_eq!(parse_time_of_day("2024-01-15T12:00:00+00:00").unwrap(), hm(12, 0));
        // Offset clock time is kept as written.
        assert_eq!(parse_time_of_day("2024-01-15T07:05:00+02:00").unwrap(), hm(7, 5));
        assert_eq!(parse_time_of_day("2024-01-15T07:05:00-0530").unwrap(), hm(7, 5));
        assert_eq!(parse_time_of_day("2024-01-15T18:45Z").unwrap(), hm(18, 45));
    }

    #[test]
    fn test_parse_naive_forms() {
        assert_eq!(parse_time_of_day("2024-01-15T06:00:00").unwrap(), hm(6, 0));
        assert_eq!(parse_time_of_day("2024-01-15 23:59:59.999").unwrap(), hm(23, 59));
        assert_eq!(parse_time_of_day("2024-01-15T00:00").unwrap(), hm(0, 0));
    }

    #[test]
    fn test_parse_reduced_and_basic_forms() {
        assert_eq!(parse_time_of_day("2024-01-15").unwrap(), hm(0, 0));
        assert_eq!(parse_time_of_day("20240115").unwrap(), hm(0, 0));
        assert_eq!(parse_time_of_day("2024-01-15T10").unwrap(), hm(10, 0));
        assert_eq!(parse_time_of_day("20240115T1030Z").unwrap(), hm(10, 30));
        assert_eq!(parse_time_of_day("20240115T103045.5+0100").unwrap(), hm(10, 30));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(parse_time_of_day("not-a-date").is_err());
        assert!(parse_time_of_day("2024-13-15T10:00:00Z").is_err());
        assert!(parse_time_of_day("2024-01-15T24:30:00Z").is_err());
        assert!(parse_time_of_day("2024-01-15T10:3").is_err());
        assert!(parse_time_of_day("2024-01-15T10:30.5").is_err());
        assert!(parse_time_of_day("2024-01-15T").is_err());
        assert!(parse_time_of_day("2024-01-15Z").is_err());
        assert!(parse_time_of_day("2024-01-15T10:00+24:00").is_err());
        assert_eq!(parse_time_of_day(""), Err(TimeParseError::Empty));
    }

    #[test]
    fn test_parse_rejects_leap_second() {
        assert_eq!(
            parse_time_of_day("2024-01-15T23:59:60Z"),
            Err(TimeParseError::Malformed("second must be in 0..59"))
        );
        assert!(parse_time_of_day("2024-01-15T23:59:59Z").is_ok());
    }

    #[test]
    fn test_valid_utc_timestamps_render_as_hh_mm() {
        for hour in 0..24u32 {
            for minute in [0u32, 1, 9, 30, 59] {
                let raw = format!("2024-03-10T{hour:02}:{minute:02}:17.250Z");
                let key = parse_time_of_day(&raw).unwrap().to_string();
                assert_eq!(key.len(), 5);
                assert_eq!(&key[2..3], ":");
                assert_eq!(key[..2].parse::<u32>().unwrap(), hour);
                assert_eq!(key[3..].parse::<u32>().unwrap(), minute);
            }
        }
    }

    #[test]
    fn test_extract_skips_failures() {
        assert_eq!(
            extract_time_of_day(&StartTime::Text("not-a-date".into())),
            None
        );
        assert_eq!(extract_time_of_day(&StartTime::Other(json!(1705320000))), None);
        assert_eq!(
            extract_time_of_day(&StartTime::Text("2024-01-15T12:00:00Z".into())),
            Some(hm(12, 0))
        );
    }

    #[test]
    fn test_extract_logs_bad_input_and_error() {
        let (time, logs) =
            with_captured_logs(|| extract_time_of_day(&StartTime::Text("not-a-date".into())));
        assert!(time.is_none());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("failed to parse start time"));
        assert!(logs.contains("input=not-a-date"));
        assert!(logs.contains("error=invalid ISO-8601 date-time"));

        let (time, logs) =
            with_captured_logs(|| extract_time_of_day(&StartTime::Other(json!(true))));
        assert!(time.is_none());
        assert!(logs.contains("expected a timestamp string, got true"));

        let (time, logs) = with_captured_logs(|| {
            extract_time_of_day(&StartTime::Text("2024-01-15T12:00:00Z".into()))
        });
        assert_eq!(time, Some(hm(12, 0)));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_time_of_day_serializes_as_hh_mm() {
        assert_eq!(serde_json::to_value(hm(9, 5)).unwrap(), json!("09:05"));
    }
}
