//! Active trading session predicate.
//!
//! Signals are honoured only inside a fixed intraday window evaluated in a
//! fixed UTC offset. Both window bounds are inclusive, at minute resolution.

use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, Timelike, Utc};

use crate::domain::error::TrendswapError;

const TIME_FORMAT: &str = "%H:%M";
const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    start: NaiveTime,
    end: NaiveTime,
    offset: FixedOffset,
}

impl Default for SessionWindow {
    fn default() -> Self {
        // 09:17 to 15:25 at UTC+05:30
        SessionWindow {
            start: NaiveTime::MIN + Duration::minutes(9 * 60 + 17),
            end: NaiveTime::MIN + Duration::minutes(15 * 60 + 25),
            offset: FixedOffset::east_opt(IST_OFFSET_SECONDS).unwrap_or(Utc.fix()),
        }
    }
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime, offset: FixedOffset) -> Self {
        SessionWindow { start, end, offset }
    }

    /// Parse `HH:MM` bounds and a `±HH:MM` offset.
    pub fn parse(start: &str, end: &str, offset: &str) -> Result<Self, TrendswapError> {
        let start = parse_time(start, "start")?;
        let end = parse_time(end, "end")?;
        if start > end {
            return Err(TrendswapError::invalid(
                "session",
                "start",
                "session start must not be after session end",
            ));
        }
        let offset = parse_offset(offset)?;
        Ok(SessionWindow::new(start, end, offset))
    }

    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.start)
    }

    pub fn end_minute(&self) -> u32 {
        minute_of_day(self.end)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn offset_seconds(&self) -> i32 {
        self.offset.local_minus_utc()
    }

    pub fn is_active(&self, timestamp: DateTime<Utc>) -> bool {
        let minute = minute_of_day(timestamp.with_timezone(&self.offset).time());
        minute >= self.start_minute() && minute <= self.end_minute()
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn parse_time(value: &str, key: &str) -> Result<NaiveTime, TrendswapError> {
    let value = value.trim();
    let invalid = |reason: String| {
        TrendswapError::invalid(
            "session",
            key,
            format!("invalid time {value:?}, expected HH:MM: {reason}"),
        )
    };
    let time = NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|e| invalid(e.to_string()))?;
    // chrono accepts single-digit fields; only zero-padded input is allowed
    if time.format(TIME_FORMAT).to_string() != value {
        return Err(invalid("fields must be two digits".to_string()));
    }
    Ok(time)
}

fn parse_offset(value: &str) -> Result<FixedOffset, TrendswapError> {
    let value = value.trim();
    let invalid = |reason: String| {
        TrendswapError::invalid(
            "session",
            "utc_offset",
            format!("invalid offset {value:?}, expected ±HH:MM: {reason}"),
        )
    };
    let offset = FixedOffset::from_str(value).map_err(|e| invalid(e.to_string()))?;
    // chrono stops at the minutes and ignores the rest of the input
    let canonical = offset.to_string();
    if canonical.get(1..) != value.get(1..) {
        return Err(invalid("trailing or unseparated fields".to_string()));
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, h, m, 0).unwrap()
    }

    #[test]
    fn default_window_is_ist_market_hours() {
        let session = SessionWindow::default();
        // 03:47 UTC == 09:17 IST
        assert!(session.is_active(utc(3, 47)));
        assert!(!session.is_active(utc(3, 46)));
        // 09:55 UTC == 15:25 IST
        assert!(session.is_active(utc(9, 55)));
        assert!(!session.is_active(utc(9, 56)));
    }

    #[test]
    fn end_minute_is_inclusive_to_the_last_second() {
        let session = SessionWindow::default();
        let late = Utc.with_ymd_and_hms(2025, 1, 2, 9, 55, 59).unwrap();
        assert!(session.is_active(late));
    }

    #[test]
    fn parse_round_trips_default() {
        let parsed = SessionWindow::parse("09:17", "15:25", "+05:30").unwrap();
        assert_eq!(parsed, SessionWindow::default());
        assert_eq!(parsed.offset_seconds(), IST_OFFSET_SECONDS);
    }

    #[test]
    fn parse_negative_offset() {
        let session = SessionWindow::parse("09:30", "16:00", "-05:00").unwrap();
        assert_eq!(session.offset_seconds(), -5 * 3600);
        // 14:30 UTC == 09:30 EST
        assert!(session.is_active(utc(14, 30)));
        assert!(!session.is_active(utc(14, 29)));
    }

    #[test]
    fn parse_accepts_negative_zero_offset() {
        let session = SessionWindow::parse("09:30", "16:00", "-00:00").unwrap();
        assert_eq!(session.offset_seconds(), 0);
    }

    #[test]
    fn parse_rejects_bad_time() {
        let err = SessionWindow::parse("9h17", "15:25", "+05:30").unwrap_err();
        assert!(matches!(err, TrendswapError::ConfigInvalid { ref key, .. } if key == "start"));
    }

    #[test]
    fn parse_rejects_signed_and_unpadded_times() {
        for start in ["+9:+17", "9:7", "9:17", "09:17:00", "24:00"] {
            let err = SessionWindow::parse(start, "15:25", "+05:30").unwrap_err();
            assert!(
                matches!(err, TrendswapError::ConfigInvalid { ref key, .. } if key == "start"),
                "{start:?} accepted"
            );
        }
    }

    #[test]
    fn parse_rejects_inverted_window() {
        assert!(SessionWindow::parse("15:25", "09:17", "+05:30").is_err());
    }

    #[test]
    fn wraps_across_utc_midnight() {
        // 20:00 UTC == 01:30 IST next day
        let session = SessionWindow::parse("01:00", "02:00", "+05:30").unwrap();
        assert!(session.is_active(utc(20, 0)));
    }

    #[test]
    fn parse_rejects_bad_offset() {
        for offset in ["05:30", "+5", "+25:00", "++05:30", "+5:3", "+05:30x", "+0530"] {
            let err = SessionWindow::parse("09:17", "15:25", offset).unwrap_err();
            assert!(
                matches!(err, TrendswapError::ConfigInvalid { ref key, .. } if key == "utc_offset"),
                "{offset:?} accepted"
            );
        }
    }
}
