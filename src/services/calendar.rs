use std::collections::HashMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::models::attendance::{AttendanceDay, AttendanceEntry, AttendanceStatus, DayStatus};

pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// Number of days in a calendar month (28–31, leap years included).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    let first = chrono::NaiveDate::from_ymd_opt(year, month, 1);
    let next_first = chrono::NaiveDate::from_ymd_opt(ny, nm, 1);
    match (first, next_first) {
        (Some(a), Some(b)) => b.signed_duration_since(a).num_days() as u32,
        _ => 0,
    }
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Calendar day → nanoseconds since epoch, pinned to noon UTC so that
/// converting back never shifts across a day boundary. Inverse of
/// [`timestamp_to_day`] for every value it produces.
pub fn day_to_timestamp(year: i32, month: u32, day: u32) -> Option<i64> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .map(|dt| dt.timestamp_millis() * NANOS_PER_MILLI)
}

/// Nanoseconds since epoch → UTC calendar day.
pub fn timestamp_to_day(nanos: i64) -> Option<(i32, u32, u32)> {
    DateTime::from_timestamp_millis(nanos / NANOS_PER_MILLI)
        .map(|dt| (dt.year(), dt.month(), dt.day()))
}

fn day_key(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Index entries by day. When duplicate entries exist for the same day the
/// last one in iteration order wins; entries with out-of-range timestamps
/// are dropped.
pub fn build_lookup(entries: &[AttendanceEntry]) -> HashMap<String, AttendanceEntry> {
    let mut lookup = HashMap::new();
    for entry in entries {
        if let Some((year, month, day)) = timestamp_to_day(entry.date) {
            lookup.insert(day_key(year, month, day), *entry);
        }
    }
    lookup
}

pub fn status_for_day(
    lookup: &HashMap<String, AttendanceEntry>,
    year: i32,
    month: u32,
    day: u32,
) -> DayStatus {
    match lookup.get(&day_key(year, month, day)).map(|e| e.status) {
        Some(AttendanceStatus::Present) => DayStatus::Present,
        Some(AttendanceStatus::Absent) => DayStatus::Absent,
        None => DayStatus::Unmarked,
    }
}

/// Marking is additive: unmarked and absent days flip to present, present
/// flips to absent. There is no path back to unmarked.
pub fn toggled(current: DayStatus) -> AttendanceStatus {
    match current {
        DayStatus::Present => AttendanceStatus::Absent,
        DayStatus::Absent | DayStatus::Unmarked => AttendanceStatus::Present,
    }
}

/// Classify every day of a month for calendar rendering.
pub fn month_days(
    year: i32,
    month: u32,
    lookup: &HashMap<String, AttendanceEntry>,
) -> Vec<AttendanceDay> {
    (1..=days_in_month(year, month))
        .map(|day| AttendanceDay {
            year,
            month,
            day,
            status: status_for_day(lookup, year, month, day),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(year: i32, month: u32, day: u32, status: AttendanceStatus) -> AttendanceEntry {
        AttendanceEntry {
            date: day_to_timestamp(year, month, day).unwrap(),
            status,
        }
    }

    #[test]
    fn timestamp_round_trips_for_every_day_of_a_month() {
        for (year, month) in [(2024, 2), (2023, 2), (2024, 12), (2025, 1), (1999, 6)] {
            for day in 1..=days_in_month(year, month) {
                let ns = day_to_timestamp(year, month, day).unwrap();
                assert_eq!(timestamp_to_day(ns), Some((year, month, day)));
            }
        }
    }

    #[test]
    fn month_lengths_including_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 1), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }

    #[test]
    fn month_navigation_wraps_year_boundaries() {
        assert_eq!(next_month(2024, 12), (2025, 1));
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(next_month(2024, 6), (2024, 7));
        assert_eq!(previous_month(2024, 6), (2024, 5));
    }

    #[test]
    fn lookup_classifies_marked_and_unmarked_days() {
        let entries = [entry(2024, 3, 5, AttendanceStatus::Present)];
        let lookup = build_lookup(&entries);
        assert_eq!(status_for_day(&lookup, 2024, 3, 5), DayStatus::Present);
        assert_eq!(status_for_day(&lookup, 2024, 3, 6), DayStatus::Unmarked);
    }

    #[test]
    fn last_entry_wins_on_duplicate_days() {
        let entries = [
            entry(2024, 3, 5, AttendanceStatus::Present),
            entry(2024, 3, 5, AttendanceStatus::Absent),
        ];
        let lookup = build_lookup(&entries);
        assert_eq!(status_for_day(&lookup, 2024, 3, 5), DayStatus::Absent);
    }

    #[test]
    fn toggle_never_returns_to_unmarked() {
        // unmarked -> present -> absent -> present -> absent ...
        let first = toggled(DayStatus::Unmarked);
        assert_eq!(first, AttendanceStatus::Present);
        let second = toggled(DayStatus::Present);
        assert_eq!(second, AttendanceStatus::Absent);
        let third = toggled(DayStatus::Absent);
        assert_eq!(third, AttendanceStatus::Present);
    }

    #[test]
    fn month_days_covers_the_whole_month() {
        let entries = [
            entry(2024, 2, 1, AttendanceStatus::Present),
            entry(2024, 2, 29, AttendanceStatus::Absent),
        ];
        let lookup = build_lookup(&entries);
        let days = month_days(2024, 2, &lookup);
        assert_eq!(days.len(), 29);
        assert_eq!(days[0].status, DayStatus::Present);
        assert_eq!(days[28].status, DayStatus::Absent);
        assert_eq!(days[1].status, DayStatus::Unmarked);
    }

    #[test]
    fn noon_pinning_survives_millisecond_truncation() {
        let ns = day_to_timestamp(2024, 3, 5).unwrap();
        // A timestamp a few hours off noon still lands on the same UTC day.
        assert_eq!(timestamp_to_day(ns + 11 * 3600 * 1_000_000_000), Some((2024, 3, 5)));
        assert_eq!(timestamp_to_day(ns - 11 * 3600 * 1_000_000_000), Some((2024, 3, 5)));
    }
}
