//! Discretizes a departure timestamp into the temporal coordinates used in
//! aggregate keys: season, day of week, daytype, rounded hour, hour range.

use crate::error::Error;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The canonical hour ranges, covering every hour of the day exactly once:
/// early morning, morning peak, noon off-peak, afternoon peak, evening
/// off-peak, late evening.
const HOUR_RANGES: [(u32, u32); 6] = [(0, 6), (7, 10), (11, 13), (14, 16), (17, 19), (20, 23)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Daytype {
    Weekday,
    Weekend,
}

impl fmt::Display for Daytype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Daytype::Weekday => write!(f, "weekday"),
            Daytype::Weekend => write!(f, "weekend"),
        }
    }
}

/// A departure timestamp reduced to discrete temporal coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    /// Quarter of the year: 1 = Mar-May, 2 = Jun-Aug, 3 = Sep-Nov,
    /// 4 = Dec-Feb.
    pub season: u32,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
    pub daytype: Daytype,
    /// Hour rounded to the nearest hour: minutes past the half hour round up.
    pub adjusted_hour: u32,
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Expands a `YYYY-MM-DD HH:MM:SS` timestamp, read as naive local time with
/// no offset conversion, into its [`TimeBucket`].
pub fn zone_timestamp(timestamp: &str) -> Result<TimeBucket, Error> {
    let dt = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .map_err(|_| Error::BadTimestamp(timestamp.to_string()))?;

    let season = ((dt.month() + 9) % 12) / 3 + 1;
    let day_of_week = dt.weekday().num_days_from_monday();
    let daytype = if day_of_week >= 5 {
        Daytype::Weekend
    } else {
        Daytype::Weekday
    };

    let adjustment = if dt.minute() > 30 { 1 } else { 0 };
    let adjusted_hour = (dt.hour() + adjustment) % 24;
    let (start_hour, end_hour) = hour_range(adjusted_hour);

    Ok(TimeBucket {
        season,
        day_of_week,
        daytype,
        adjusted_hour,
        start_hour,
        end_hour,
    })
}

fn hour_range(hour: u32) -> (u32, u32) {
    HOUR_RANGES
        .iter()
        .copied()
        .find(|&(start, end)| hour >= start && hour <= end)
        .unwrap_or(HOUR_RANGES[0]) // the ranges cover all of 0..=23
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seasons() {
        assert_eq!(zone_timestamp("2016-03-15 12:00:00").unwrap().season, 1);
        assert_eq!(zone_timestamp("2016-05-15 12:00:00").unwrap().season, 1);
        assert_eq!(zone_timestamp("2016-06-15 12:00:00").unwrap().season, 2);
        assert_eq!(zone_timestamp("2016-08-15 12:00:00").unwrap().season, 2);
        assert_eq!(zone_timestamp("2016-09-15 12:00:00").unwrap().season, 3);
        assert_eq!(zone_timestamp("2016-11-15 12:00:00").unwrap().season, 3);
        assert_eq!(zone_timestamp("2016-12-15 12:00:00").unwrap().season, 4);
        assert_eq!(zone_timestamp("2016-01-15 12:00:00").unwrap().season, 4);
        assert_eq!(zone_timestamp("2016-02-15 12:00:00").unwrap().season, 4);
    }

    #[test]
    fn test_day_of_week_monday_based() {
        // 2016-01-04 was a Monday.
        let monday = zone_timestamp("2016-01-04 12:00:00").unwrap();
        assert_eq!(monday.day_of_week, 0);
        assert_eq!(monday.daytype, Daytype::Weekday);

        let friday = zone_timestamp("2016-01-08 12:00:00").unwrap();
        assert_eq!(friday.day_of_week, 4);
        assert_eq!(friday.daytype, Daytype::Weekday);

        let saturday = zone_timestamp("2016-01-09 12:00:00").unwrap();
        assert_eq!(saturday.day_of_week, 5);
        assert_eq!(saturday.daytype, Daytype::Weekend);

        let sunday = zone_timestamp("2016-01-10 12:00:00").unwrap();
        assert_eq!(sunday.day_of_week, 6);
        assert_eq!(sunday.daytype, Daytype::Weekend);
    }

    #[test]
    fn test_hour_rounding() {
        assert_eq!(zone_timestamp("2016-01-04 09:30:00").unwrap().adjusted_hour, 9);
        assert_eq!(zone_timestamp("2016-01-04 09:31:00").unwrap().adjusted_hour, 10);
        assert_eq!(zone_timestamp("2016-01-04 09:29:59").unwrap().adjusted_hour, 9);
        // Rounding past midnight wraps.
        assert_eq!(zone_timestamp("2016-01-04 23:45:00").unwrap().adjusted_hour, 0);
    }

    #[test]
    fn test_hour_ranges() {
        let early = zone_timestamp("2016-01-04 03:00:00").unwrap();
        assert_eq!((early.start_hour, early.end_hour), (0, 6));

        let morning_peak = zone_timestamp("2016-01-04 08:15:00").unwrap();
        assert_eq!((morning_peak.start_hour, morning_peak.end_hour), (7, 10));

        let late = zone_timestamp("2016-01-04 22:00:00").unwrap();
        assert_eq!((late.start_hour, late.end_hour), (20, 23));

        // 23:45 rounds up to hour 0, which belongs to the early range.
        let wrapped = zone_timestamp("2016-01-04 23:45:00").unwrap();
        assert_eq!((wrapped.start_hour, wrapped.end_hour), (0, 6));
    }

    #[test]
    fn test_bucket_invariants_for_every_hour_and_minute() {
        for hour in 0..24 {
            for minute in [0, 29, 30, 31, 59] {
                let ts = format!("2016-07-20 {hour:02}:{minute:02}:00");
                let bucket = zone_timestamp(&ts).unwrap();
                assert!((1..=4).contains(&bucket.season));
                assert!(bucket.day_of_week <= 6);
                assert!(bucket.adjusted_hour <= 23);
                assert!(
                    bucket.start_hour <= bucket.adjusted_hour
                        && bucket.adjusted_hour <= bucket.end_hour,
                    "{ts}: adjusted hour {} outside range [{}, {}]",
                    bucket.adjusted_hour,
                    bucket.start_hour,
                    bucket.end_hour
                );
            }
        }
    }

    #[test]
    fn test_bad_timestamps() {
        assert!(matches!(
            zone_timestamp("2016/01/04 12:00:00"),
            Err(Error::BadTimestamp(_))
        ));
        assert!(matches!(zone_timestamp("not a date"), Err(Error::BadTimestamp(_))));
        assert!(matches!(zone_timestamp(""), Err(Error::BadTimestamp(_))));
        assert!(matches!(
            zone_timestamp("2016-13-40 12:00:00"),
            Err(Error::BadTimestamp(_))
        ));
    }
}
