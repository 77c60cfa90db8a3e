//! Time utilities: hour-of-day buckets and timezone-aware local hours.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse partition of the day.
///
/// - morning: 06..=11
/// - afternoon: 12..=16
/// - evening: 17..=20
/// - night: 21..=23 and 00..=05
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
        TimeBucket::Night,
    ];

    /// Total over any hour; values past 23 wrap around the clock.
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            6..=11 => TimeBucket::Morning,
            12..=16 => TimeBucket::Afternoon,
            17..=20 => TimeBucket::Evening,
            _ => TimeBucket::Night,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Evening => "evening",
            TimeBucket::Night => "night",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Hour-of-day (0..=23) of `at` as seen in the IANA timezone `tz`.
pub fn local_hour(at: DateTime<Utc>, tz: &str) -> Result<u8> {
    let tz = parse_tz(tz)?;
    Ok(at.with_timezone(&tz).hour() as u8)
}

/// Weekday of `at` as seen in the IANA timezone `tz`.
pub fn local_weekday(at: DateTime<Utc>, tz: &str) -> Result<Weekday> {
    let tz = parse_tz(tz)?;
    Ok(at.with_timezone(&tz).weekday())
}

/// Parse a timestamp like "2026-02-20 23:59" in an IANA tz like "America/Chicago",
/// returning UTC. Also accepts RFC3339 directly.
pub fn parse_local_to_utc(local: &str, tz: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(local) {
        return Ok(dt.with_timezone(&Utc));
    }

    let tz = parse_tz(tz)?;
    let ndt = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M")
        .map_err(|e| anyhow::anyhow!("invalid local datetime '{local}': {e}"))?;

    let local_dt = tz
        .from_local_datetime(&ndt)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {local} {tz}"))?;

    Ok(local_dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_hour_maps_to_exactly_one_bucket() {
        let mut counts = [0usize; 4];
        for h in 0..24 {
            let b = TimeBucket::from_hour(h);
            counts[TimeBucket::ALL.iter().position(|x| *x == b).unwrap()] += 1;
        }
        assert_eq!(counts, [6, 5, 4, 9]);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(TimeBucket::from_hour(5), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(6), TimeBucket::Morning);
        assert_eq!(TimeBucket::from_hour(11), TimeBucket::Morning);
        assert_eq!(TimeBucket::from_hour(12), TimeBucket::Afternoon);
        assert_eq!(TimeBucket::from_hour(16), TimeBucket::Afternoon);
        assert_eq!(TimeBucket::from_hour(17), TimeBucket::Evening);
        assert_eq!(TimeBucket::from_hour(20), TimeBucket::Evening);
        assert_eq!(TimeBucket::from_hour(21), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(0), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(33), TimeBucket::Morning);
    }

    #[test]
    fn local_hour_in_chicago() {
        // Feb is CST (UTC-6)
        let at = Utc.with_ymd_and_hms(2026, 2, 21, 15, 30, 0).unwrap();
        assert_eq!(local_hour(at, "America/Chicago").unwrap(), 9);
        assert_eq!(local_hour(at, "UTC").unwrap(), 15);
        assert!(local_hour(at, "Mars/Olympus").is_err());
    }

    #[test]
    fn parse_chicago_timestamp() {
        let utc = parse_local_to_utc("2026-02-20 23:59", "America/Chicago").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-21T05:59:00+00:00");

        let direct = parse_local_to_utc("2026-02-21T05:59:00Z", "America/Chicago").unwrap();
        assert_eq!(direct, utc);
    }
}
