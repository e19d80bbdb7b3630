//! Appointment times and the slot overlap rule.
//!
//! Times travel over the API as zero-padded `HH:MM` strings. They are parsed
//! into [`TimeOfDay`] so that ordering is numeric rather than lexicographic,
//! and every appointment's range is a half-open [`TimeSlot`] `[start, end)`.
//!
//! Two slots on the same date conflict when any of the following holds:
//!
//! 1. the new start falls inside the existing range,
//! 2. the new end falls inside the existing range,
//! 3. the new range contains the existing range.
//!
//! Back-to-back slots (`10:00-10:30` then `10:30-11:00`) do not conflict.

use core::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors produced while parsing times or building slots.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The input is not a zero-padded `HH:MM` value.
    #[error("time must use the HH:MM format (got '{0}')")]
    InvalidFormat(String),
    /// Hour or minute out of range.
    #[error("time is out of range (got '{0}')")]
    OutOfRange(String),
    /// The slot ends at or before its start.
    #[error("endTime must be after startTime")]
    EmptySlot,
}

/// A wall-clock time with minute precision.
///
/// ```
/// use atelier_core::TimeOfDay;
///
/// let t: TimeOfDay = "09:05".parse().unwrap();
/// assert_eq!(t.to_string(), "09:05");
/// assert!("9:05".parse::<TimeOfDay>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Build a time from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::OutOfRange` unless `hour < 24` and `minute < 60`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        if hour >= 24 || minute >= 60 {
            return Err(ScheduleError::OutOfRange(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    /// Parse a strict `HH:MM` string.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::InvalidFormat` unless the input is exactly two
    /// digits, a colon and two digits, and `ScheduleError::OutOfRange` for
    /// values such as `24:00` or `10:60`.
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let bytes = s.as_bytes();
        let [h1, h0, b':', m1, m0] = bytes else {
            return Err(ScheduleError::InvalidFormat(s.to_owned()));
        };
        let digit = |b: u8| {
            b.is_ascii_digit()
                .then(|| b - b'0')
                .ok_or_else(|| ScheduleError::InvalidFormat(s.to_owned()))
        };
        let hour = digit(*h1)? * 10 + digit(*h0)?;
        let minute = digit(*m1)? * 10 + digit(*m0)?;
        Self::new(hour, minute).map_err(|_| ScheduleError::OutOfRange(s.to_owned()))
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component.
    #[must_use]
    pub const fn hour(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)] // at most 23
        let hour = (self.0 / 60) as u8;
        hour
    }

    /// Minute component.
    #[must_use]
    pub const fn minute(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)] // at most 59
        let minute = (self.0 % 60) as u8;
        minute
    }

    /// Convert to a `chrono` time (seconds are always zero).
    #[must_use]
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Convert from a `chrono` time, dropping seconds.
    #[must_use]
    pub fn from_naive_time(time: NaiveTime) -> Self {
        #[allow(clippy::cast_possible_truncation)] // hour < 24, minute < 60
        let minutes = (time.hour() * 60 + time.minute()) as u16;
        Self(minutes)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for TimeOfDay {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <NaiveTime as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <NaiveTime as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TimeOfDay {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let time = <NaiveTime as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_naive_time(time))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for TimeOfDay {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <NaiveTime as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_naive_time(), buf)
    }
}

/// A half-open time range `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    start_time: TimeOfDay,
    end_time: TimeOfDay,
}

impl TimeSlot {
    /// Build a slot.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::EmptySlot` if `end <= start`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, ScheduleError> {
        if end <= start {
            return Err(ScheduleError::EmptySlot);
        }
        Ok(Self {
            start_time: start,
            end_time: end,
        })
    }

    /// Parse a slot from two `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either time is malformed or the slot is empty.
    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Self::new(TimeOfDay::parse(start)?, TimeOfDay::parse(end)?)
    }

    /// Start of the slot (inclusive).
    #[must_use]
    pub const fn start(&self) -> TimeOfDay {
        self.start_time
    }

    /// End of the slot (exclusive).
    #[must_use]
    pub const fn end(&self) -> TimeOfDay {
        self.end_time
    }

    /// Length in minutes.
    #[must_use]
    pub const fn duration_minutes(&self) -> u16 {
        self.end_time.minutes() - self.start_time.minutes()
    }

    /// Whether `self` (the candidate) collides with `existing`.
    ///
    /// Evaluates the booking rule clause by clause: candidate start inside
    /// `existing`, candidate end inside `existing`, or candidate covering
    /// `existing`.
    #[must_use]
    pub fn overlaps(&self, existing: &Self) -> bool {
        let start_inside = existing.start_time <= self.start_time && self.start_time < existing.end_time;
        let end_inside = existing.start_time < self.end_time && self.end_time <= existing.end_time;
        let covers = self.start_time <= existing.start_time && existing.end_time <= self.end_time;
        start_inside || end_inside || covers
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_time, self.end_time)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::parse(start, end).unwrap()
    }

    #[test]
    fn test_parse_valid_times() {
        assert_eq!(TimeOfDay::parse("00:00").unwrap().minutes(), 0);
        assert_eq!(TimeOfDay::parse("10:30").unwrap().minutes(), 630);
        assert_eq!(TimeOfDay::parse("23:59").unwrap().minutes(), 1439);
    }

    #[test]
    fn test_parse_rejects_unpadded_and_malformed() {
        for input in ["9:00", "09:0", "0900", "09-00", "ab:cd", "", " 09:00", "09:00:00"] {
            assert!(
                matches!(TimeOfDay::parse(input), Err(ScheduleError::InvalidFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(TimeOfDay::parse("24:00"), Err(ScheduleError::OutOfRange(_))));
        assert!(matches!(TimeOfDay::parse("10:60"), Err(ScheduleError::OutOfRange(_))));
    }

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(TimeOfDay::new(7, 5).unwrap().to_string(), "07:05");
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(TimeOfDay::parse("09:59").unwrap() < TimeOfDay::parse("10:00").unwrap());
    }

    #[test]
    fn test_naive_time_conversion() {
        let t = TimeOfDay::parse("18:45").unwrap();
        let naive = t.to_naive_time();
        assert_eq!(naive, NaiveTime::from_hms_opt(18, 45, 0).unwrap());
        assert_eq!(TimeOfDay::from_naive_time(naive), t);
    }

    #[test]
    fn test_serde_uses_hh_mm() {
        let t = TimeOfDay::parse("08:15").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"08:15\"");
        assert_eq!(serde_json::from_str::<TimeOfDay>("\"08:15\"").unwrap(), t);
        assert!(serde_json::from_str::<TimeOfDay>("\"8:15\"").is_err());
    }

    #[test]
    fn test_slot_requires_positive_length() {
        assert_eq!(TimeSlot::parse("10:00", "10:00"), Err(ScheduleError::EmptySlot));
        assert_eq!(TimeSlot::parse("11:00", "10:00"), Err(ScheduleError::EmptySlot));
        assert_eq!(slot("10:00", "10:45").duration_minutes(), 45);
    }

    #[test]
    fn test_booking_example() {
        let a = slot("10:00", "10:30");
        assert!(slot("10:15", "10:45").overlaps(&a));
        assert!(!slot("10:30", "11:00").overlaps(&a));
    }

    #[test]
    fn test_each_clause() {
        let existing = slot("12:00", "13:00");
        // start inside
        assert!(slot("12:30", "14:00").overlaps(&existing));
        // end inside
        assert!(slot("11:00", "12:30").overlaps(&existing));
        // covers
        assert!(slot("11:00", "14:00").overlaps(&existing));
        // identical
        assert!(slot("12:00", "13:00").overlaps(&existing));
        // contained
        assert!(slot("12:15", "12:45").overlaps(&existing));
    }

    #[test]
    fn test_adjacent_slots_do_not_overlap() {
        let existing = slot("12:00", "13:00");
        assert!(!slot("11:00", "12:00").overlaps(&existing));
        assert!(!slot("13:00", "14:00").overlaps(&existing));
    }

    #[test]
    fn test_matches_half_open_interval_intersection() {
        // Exhaustive over a 2-hour window at 15-minute resolution.
        let times: Vec<TimeOfDay> = (0..=8)
            .map(|i| TimeOfDay::new(10 + i / 4, (i % 4) * 15).unwrap())
            .collect();
        let mut slots = Vec::new();
        for (i, s) in times.iter().enumerate() {
            for e in times.iter().skip(i + 1) {
                slots.push(TimeSlot::new(*s, *e).unwrap());
            }
        }
        for a in &slots {
            for b in &slots {
                let expected = a.start() < b.end() && b.start() < a.end();
                assert_eq!(a.overlaps(b), expected, "{a} vs {b}");
                assert_eq!(a.overlaps(b), b.overlaps(a), "{a} vs {b} symmetry");
            }
        }
    }
}
