//! Typed wall-clock schedule specs.
//!
//! A schedule is a weekday set, an hour (or inclusive hour range), and a
//! minute-of-hour — validated once at startup instead of being glued
//! together as a cron string. Times are host-local.

use chrono::{DateTime, Datelike, Duration, Local, Timelike, Weekday};

use tracklab_core::error::{Result, TrackLabError};

/// Hour-of-day constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourSpec {
    /// Exactly this hour.
    At(u32),
    /// Every hour in the inclusive range.
    Between(u32, u32),
}

/// A recurring weekly schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdaySchedule {
    pub weekdays: Vec<Weekday>,
    pub hours: HourSpec,
    pub minute: u32,
}

const MON_FRI: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

impl WeekdaySchedule {
    /// Mon–Fri at a fixed time of day.
    pub fn weekdays_at(hour: u32, minute: u32) -> Self {
        Self {
            weekdays: MON_FRI.to_vec(),
            hours: HourSpec::At(hour),
            minute,
        }
    }

    /// Mon–Fri, every hour in `start_hour..=end_hour`, at `minute` past.
    pub fn weekdays_between(start_hour: u32, end_hour: u32, minute: u32) -> Self {
        Self {
            weekdays: MON_FRI.to_vec(),
            hours: HourSpec::Between(start_hour, end_hour),
            minute,
        }
    }

    /// Check the spec at startup; a bad config should fail the boot, not
    /// silently never fire.
    pub fn validate(&self) -> Result<()> {
        if self.weekdays.is_empty() {
            return Err(TrackLabError::Schedule("weekday set is empty".into()));
        }
        if self.minute > 59 {
            return Err(TrackLabError::Schedule(format!("minute {} out of range", self.minute)));
        }
        match self.hours {
            HourSpec::At(h) if h > 23 => {
                Err(TrackLabError::Schedule(format!("hour {h} out of range")))
            }
            HourSpec::Between(s, e) if s > e => {
                Err(TrackLabError::Schedule(format!("hour range {s}-{e} is inverted")))
            }
            HourSpec::Between(_, e) if e > 23 => {
                Err(TrackLabError::Schedule(format!("hour {e} out of range")))
            }
            _ => Ok(()),
        }
    }

    /// Does `t` (truncated to the minute) match this schedule?
    pub fn matches(&self, t: &DateTime<Local>) -> bool {
        if !self.weekdays.contains(&t.weekday()) || t.minute() != self.minute {
            return false;
        }
        match self.hours {
            HourSpec::At(h) => t.hour() == h,
            HourSpec::Between(s, e) => (s..=e).contains(&t.hour()),
        }
    }

    /// The next matching instant strictly after `after`, found by scanning
    /// forward minute by minute. Any non-empty weekday set matches within a
    /// week, so the scan is bounded to eight days.
    pub fn next_fire(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        let mut candidate = after + Duration::minutes(1);
        candidate = candidate.with_second(0).unwrap_or(candidate);
        candidate = candidate.with_nanosecond(0).unwrap_or(candidate);

        for _ in 0..(8 * 24 * 60) {
            if self.matches(&candidate) {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(WeekdaySchedule::weekdays_at(17, 0).validate().is_ok());
        assert!(WeekdaySchedule::weekdays_at(24, 0).validate().is_err());
        assert!(WeekdaySchedule::weekdays_at(17, 60).validate().is_err());
        assert!(WeekdaySchedule::weekdays_between(17, 8, 30).validate().is_err());
        let empty = WeekdaySchedule { weekdays: vec![], hours: HourSpec::At(9), minute: 0 };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_next_fire_same_day() {
        // 2026-02-24 is a Tuesday
        let schedule = WeekdaySchedule::weekdays_at(17, 0);
        let next = schedule.next_fire(local(2026, 2, 24, 10, 15)).unwrap();
        assert_eq!(next, local(2026, 2, 24, 17, 0));
    }

    #[test]
    fn test_next_fire_skips_weekend() {
        // Friday 17:05 → next analysis slot is Monday 17:00
        let schedule = WeekdaySchedule::weekdays_at(17, 0);
        let next = schedule.next_fire(local(2026, 2, 27, 17, 5)).unwrap();
        assert_eq!(next, local(2026, 3, 2, 17, 0));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_hour_window_popup_cadence() {
        let schedule = WeekdaySchedule::weekdays_between(8, 17, 30);
        // mid-window: next half-hour mark
        let next = schedule.next_fire(local(2026, 2, 24, 9, 30)).unwrap();
        assert_eq!(next, local(2026, 2, 24, 10, 30));
        // after the window closes: tomorrow's first slot
        let next = schedule.next_fire(local(2026, 2, 24, 17, 45)).unwrap();
        assert_eq!(next, local(2026, 2, 25, 8, 30));
    }

    #[test]
    fn test_exact_boundary_is_strictly_after() {
        let schedule = WeekdaySchedule::weekdays_at(17, 0);
        let next = schedule.next_fire(local(2026, 2, 24, 17, 0)).unwrap();
        assert_eq!(next, local(2026, 2, 25, 17, 0));
    }
}
