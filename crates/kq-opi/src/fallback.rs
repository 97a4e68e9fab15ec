//! Fabricated OPI values for when the endpoint is unavailable.
//!
//! The value is random but biased to look like real congestion: busier in
//! the evening than at night, busier on weekends, busier still on public
//! holidays.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Weekday};
use kq_core::{Opi, TimeOfDay};
use rand::Rng;
use rand::rngs::StdRng;

/// Holidays as `(month, day)`: New Year, Golden Week, Obon, year end.
const HOLIDAYS: &[(u32, u32)] = &[
    (1, 1),
    (1, 2),
    (1, 3),
    (5, 3),
    (5, 4),
    (5, 5),
    (8, 11),
    (8, 12),
    (8, 13),
    (8, 14),
    (8, 15),
    (12, 29),
    (12, 30),
    (12, 31),
];

const WEEKEND_SHIFT: u8 = 10;
const HOLIDAY_SHIFT: u8 = 15;

/// Base draw range for a time of day.
pub fn base_range(time: TimeOfDay) -> (u8, u8) {
    match time {
        TimeOfDay::Morning => (25, 50),
        TimeOfDay::Noon => (45, 75),
        TimeOfDay::Evening => (60, 90),
        TimeOfDay::Night => (20, 45),
    }
}

/// Whether a date is on the holiday calendar.
pub fn is_holiday(date: NaiveDate) -> bool {
    HOLIDAYS.contains(&(date.month(), date.day()))
}

/// Whether a date falls on Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The inclusive range a fallback value is drawn from at `now` (local time).
pub fn fallback_range<Tz: TimeZone>(now: &DateTime<Tz>) -> (u8, u8) {
    let (mut min, mut max) = base_range(TimeOfDay::of(now));
    let date = now.date_naive();
    if is_weekend(date) {
        min = min.saturating_add(WEEKEND_SHIFT).min(100);
        max = max.saturating_add(WEEKEND_SHIFT).min(100);
    }
    if is_holiday(date) {
        min = min.saturating_add(HOLIDAY_SHIFT).min(100);
        max = max.saturating_add(HOLIDAY_SHIFT).min(100);
    }
    (min, max)
}

/// Draw a fallback OPI for local time `now`.
pub fn fallback_opi<Tz: TimeZone>(now: &DateTime<Tz>, rng: &mut StdRng) -> Opi {
    let (min, max) = fallback_range(now);
    Opi::new(i64::from(rng.random_range(min..=max)))
}
