//! Minute-of-day alarm time arithmetic and display formatting.

use std::fmt;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// An alarm target as minutes since midnight, in [0, 1439].
///
/// 0 is 12:00 AM, 1439 is 11:59 PM. Monotonically non-decreasing while
/// being danced toward; resets to midnight when the alarm is cancelled or
/// stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlarmTime(u16);

impl AlarmTime {
    /// 12:00 AM
    pub const MIDNIGHT: AlarmTime = AlarmTime(0);

    /// 11:59 PM
    pub const MAX: AlarmTime = AlarmTime(24 * 60 - 1);

    /// Build from minutes since midnight, clamping past 11:59 PM
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes.min(Self::MAX.0 as u32) as u16)
    }

    pub fn as_minutes(&self) -> u16 {
        self.0
    }

    /// Advance by `minutes`, clamping at 11:59 PM - dancing past the
    /// maximum does not wrap.
    pub fn saturating_add(&self, minutes: u32) -> Self {
        Self::from_minutes(self.0 as u32 + minutes)
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    pub fn is_midnight(&self) -> bool {
        self.0 == 0
    }

    /// Position in the day as [0, 1] - drives the dance-meter fill
    pub fn fraction_of_day(&self) -> f64 {
        self.0 as f64 / Self::MAX.0 as f64
    }
}

impl fmt::Display for AlarmTime {
    /// 12-hour clock: hour 0 and hour 12 both render as 12
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour24 = self.hour();
        let display_hour = match hour24 % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if hour24 < 12 { "AM" } else { "PM" };
        write!(f, "{}:{:02} {}", display_hour, self.minute(), meridiem)
    }
}

/// Minute-of-day of a wall-clock reading, for the waiting-mode comparison
pub fn minute_of_day<T: Timelike>(time: &T) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn saturating_add_clamps_at_max() {
        let almost = AlarmTime::from_minutes(1430);
        assert_eq!(almost.saturating_add(5).as_minutes(), 1435);
        assert_eq!(almost.saturating_add(500), AlarmTime::MAX);
        assert_eq!(AlarmTime::MAX.saturating_add(1), AlarmTime::MAX);
    }

    #[test]
    fn from_minutes_clamps() {
        assert_eq!(AlarmTime::from_minutes(5000), AlarmTime::MAX);
    }

    #[test]
    fn twelve_hour_formatting() {
        assert_eq!(AlarmTime::MIDNIGHT.to_string(), "12:00 AM");
        assert_eq!(AlarmTime::from_minutes(5).to_string(), "12:05 AM");
        assert_eq!(AlarmTime::from_minutes(7 * 60 + 30).to_string(), "7:30 AM");
        assert_eq!(AlarmTime::from_minutes(12 * 60).to_string(), "12:00 PM");
        assert_eq!(AlarmTime::from_minutes(13 * 60 + 5).to_string(), "1:05 PM");
        assert_eq!(AlarmTime::MAX.to_string(), "11:59 PM");
    }

    #[test]
    fn fraction_of_day_spans_unit_interval() {
        assert_eq!(AlarmTime::MIDNIGHT.fraction_of_day(), 0.0);
        assert_eq!(AlarmTime::MAX.fraction_of_day(), 1.0);
    }

    #[test]
    fn minute_of_day_from_wall_clock() {
        let t = NaiveTime::from_hms_opt(7, 30, 45).unwrap();
        assert_eq!(minute_of_day(&t), 450);
    }
}
