//! Single-occurrence date resolution.
//!
//! Every function takes the anchor ("now") explicitly and returns a date
//! strictly derived from it. The anchor's time-of-day is carried onto every
//! result; phrases resolved here never specify a time of their own.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::error::{Result, Text2TimeError};
use crate::phrase::OffsetUnit;

/// A resolved start/end pair. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Shift the anchor by a signed number of days, weeks or months.
///
/// Month arithmetic clamps to the end of the target month
/// (January 31 + 1 month = February 28/29).
///
/// # Errors
///
/// Returns [`Text2TimeError::InvalidDate`] if the result leaves the
/// representable calendar range.
pub fn add_offset(anchor: NaiveDateTime, amount: i64, unit: OffsetUnit) -> Result<NaiveDateTime> {
    let out_of_range =
        || Text2TimeError::InvalidDate(format!("offset of {amount} {unit:?} is out of range"));

    match unit {
        OffsetUnit::Days => shift_days(anchor, amount).ok_or_else(out_of_range),
        OffsetUnit::Weeks => amount
            .checked_mul(7)
            .and_then(|days| shift_days(anchor, days))
            .ok_or_else(out_of_range),
        OffsetUnit::Months => {
            let months = u32::try_from(amount.unsigned_abs()).map_err(|_| out_of_range())?;
            let months = Months::new(months);
            let shifted = if amount >= 0 {
                anchor.checked_add_months(months)
            } else {
                anchor.checked_sub_months(months)
            };
            shifted.ok_or_else(out_of_range)
        }
    }
}

fn shift_days(anchor: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        anchor.checked_add_days(magnitude)
    } else {
        anchor.checked_sub_days(magnitude)
    }
}

/// The next `weekday` strictly after the anchor: 1 to 7 days ahead, never
/// the anchor's own day.
pub fn next_weekday(anchor: NaiveDateTime, weekday: Weekday) -> Result<NaiveDateTime> {
    let days_ahead = (weekday.num_days_from_sunday() + 7
        - anchor.weekday().num_days_from_sunday())
        % 7;
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    anchor
        .checked_add_days(Days::new(u64::from(days_ahead)))
        .ok_or_else(|| Text2TimeError::InvalidDate(format!("next {weekday} is out of range")))
}

/// The earliest date strictly after the anchor whose day-of-month is `day`.
///
/// Starts in the anchor's month and rolls over month by month, skipping
/// months that do not have `day` (the 31st in June).
///
/// # Errors
///
/// Returns [`Text2TimeError::InvalidArgument`] if `day` is outside 1-31.
pub fn next_day_of_month(anchor: NaiveDateTime, day: u32) -> Result<NaiveDateTime> {
    if !(1..=31).contains(&day) {
        return Err(Text2TimeError::InvalidArgument(format!(
            "day {day} is outside 1-31"
        )));
    }

    let first_of_month = anchor
        .date()
        .with_day(1)
        .ok_or_else(|| Text2TimeError::InvalidDate(format!("{anchor}")))?;

    // Every day 1-31 occurs at least once in any run of 12 months.
    for offset in 0..=12 {
        let Some(month_start) = first_of_month.checked_add_months(Months::new(offset)) else {
            break;
        };
        let Some(date) = month_start.with_day(day) else {
            continue;
        };
        let candidate = date.and_time(anchor.time());
        if candidate > anchor {
            return Ok(candidate);
        }
    }

    Err(Text2TimeError::InvalidDate(format!(
        "no day {day} after {anchor}"
    )))
}

/// The next occurrence of `day` `month` strictly after the anchor, this
/// year or a following one.
///
/// February 29 resolves to the next leap year.
///
/// # Errors
///
/// Returns [`Text2TimeError::InvalidArgument`] for a month outside 1-12 and
/// [`Text2TimeError::InvalidDate`] for a day the month never has
/// (February 30, April 31).
pub fn next_date(anchor: NaiveDateTime, day: u32, month: u32) -> Result<NaiveDateTime> {
    check_month(month)?;
    // 2000 is a leap year, so this accepts every day any year can have.
    if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
        return Err(Text2TimeError::InvalidDate(format!(
            "month {month} has no day {day}"
        )));
    }

    // Leap days recur at most 8 years apart (across a skipped century leap year).
    for year in anchor.year()..=anchor.year() + 8 {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let candidate = date.and_time(anchor.time());
        if candidate > anchor {
            return Ok(candidate);
        }
    }

    Err(Text2TimeError::InvalidDate(format!(
        "no {month}/{day} after {anchor}"
    )))
}

/// The `week`-th `weekday` of `month`.
///
/// The month is taken in the anchor's year when it is the anchor's month or
/// later, otherwise in the following year. `week` counts from 1.
///
/// # Errors
///
/// Returns [`Text2TimeError::InvalidArgument`] for a month outside 1-12 or a
/// week of 0, and [`Text2TimeError::InvalidDate`] when the month has no such
/// weekday (a fifth Monday in a four-Monday month).
pub fn nth_weekday_of_month(
    anchor: NaiveDateTime,
    month: u32,
    week: u32,
    weekday: Weekday,
) -> Result<NaiveDateTime> {
    check_month(month)?;
    if week == 0 {
        return Err(Text2TimeError::InvalidArgument(
            "week ordinal starts at 1".to_string(),
        ));
    }

    let year = target_year(anchor, month);
    let date = find_nth_weekday_in_month(year, month, weekday, week).ok_or_else(|| {
        Text2TimeError::InvalidDate(format!(
            "{year}-{month:02} has no week {week} {weekday}"
        ))
    })?;
    Ok(date.and_time(anchor.time()))
}

/// The span from the `week`-th `start` weekday of `month` to the following
/// `end` weekday (same day when `start == end`).
///
/// # Errors
///
/// Same conditions as [`nth_weekday_of_month`].
pub fn weekday_range(
    anchor: NaiveDateTime,
    month: u32,
    week: u32,
    start: Weekday,
    end: Weekday,
) -> Result<Interval> {
    let start_at = nth_weekday_of_month(anchor, month, week, start)?;
    let span = (end.num_days_from_sunday() + 7 - start.num_days_from_sunday()) % 7;
    let end_at = start_at
        .checked_add_days(Days::new(u64::from(span)))
        .ok_or_else(|| Text2TimeError::InvalidDate(format!("{start_at} + {span} days")))?;
    Ok(Interval {
        start: start_at,
        end: end_at,
    })
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Text2TimeError::InvalidArgument(format!(
            "month {month} is outside 1-12"
        )))
    }
}

/// The anchor's year, or the next one when `month` has already passed.
fn target_year(anchor: NaiveDateTime, month: u32) -> i32 {
    if month < anchor.month() {
        anchor.year() + 1
    } else {
        anchor.year()
    }
}

/// Find the Nth weekday in a month, scanning forward from the 1st.
fn find_nth_weekday_in_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    ordinal: u32,
) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let diff = (weekday.num_days_from_sunday() + 7 - first.weekday().num_days_from_sunday()) % 7;
    let first_occurrence = first.checked_add_days(Days::new(u64::from(diff)))?;
    let skip = u64::from(ordinal.checked_sub(1)?).checked_mul(7)?;
    let target = first_occurrence.checked_add_days(Days::new(skip))?;
    // Still in the same month
    (target.month() == month).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = "%Y-%m-%d %A %H:%M";

    /// Monday, May 15 2023 at noon.
    fn anchor() -> NaiveDateTime {
        at(2023, 5, 15)
    }

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn fmt(dt: NaiveDateTime) -> String {
        dt.format(FORMAT).to_string()
    }

    // ── add_offset ──────────────────────────────────────────────────────

    #[test]
    fn test_add_one_day() {
        let result = add_offset(anchor(), 1, OffsetUnit::Days).unwrap();
        assert_eq!(fmt(result), "2023-05-16 Tuesday 12:00");
    }

    #[test]
    fn test_add_seven_days_equals_one_week() {
        let days = add_offset(anchor(), 7, OffsetUnit::Days).unwrap();
        let weeks = add_offset(anchor(), 1, OffsetUnit::Weeks).unwrap();
        assert_eq!(days, weeks);
        assert_eq!(fmt(weeks), "2023-05-22 Monday 12:00");
    }

    #[test]
    fn test_add_two_weeks() {
        let result = add_offset(anchor(), 2, OffsetUnit::Weeks).unwrap();
        assert_eq!(fmt(result), "2023-05-29 Monday 12:00");
    }

    #[test]
    fn test_add_one_month() {
        let result = add_offset(anchor(), 1, OffsetUnit::Months).unwrap();
        assert_eq!(fmt(result), "2023-06-15 Thursday 12:00");
    }

    #[test]
    fn test_add_month_clamps_to_month_end() {
        let result = add_offset(at(2023, 1, 31), 1, OffsetUnit::Months).unwrap();
        assert_eq!(fmt(result), "2023-02-28 Tuesday 12:00");
    }

    #[test]
    fn test_add_negative_amount_goes_back() {
        let result = add_offset(anchor(), -1, OffsetUnit::Months).unwrap();
        assert_eq!(fmt(result), "2023-04-15 Saturday 12:00");
        let result = add_offset(anchor(), -3, OffsetUnit::Days).unwrap();
        assert_eq!(fmt(result), "2023-05-12 Friday 12:00");
    }

    #[test]
    fn test_add_out_of_range_is_error() {
        let err = add_offset(anchor(), i64::MAX, OffsetUnit::Weeks).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidDate(_)), "got: {err}");
        let err = add_offset(anchor(), i64::MAX, OffsetUnit::Months).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidDate(_)), "got: {err}");
    }

    // ── next_weekday ────────────────────────────────────────────────────

    #[test]
    fn test_next_tuesday() {
        let result = next_weekday(anchor(), Weekday::Tue).unwrap();
        assert_eq!(fmt(result), "2023-05-16 Tuesday 12:00");
    }

    #[test]
    fn test_next_thursday_and_saturday() {
        assert_eq!(
            fmt(next_weekday(anchor(), Weekday::Thu).unwrap()),
            "2023-05-18 Thursday 12:00"
        );
        assert_eq!(
            fmt(next_weekday(anchor(), Weekday::Sat).unwrap()),
            "2023-05-20 Saturday 12:00"
        );
    }

    #[test]
    fn test_next_same_weekday_is_one_week_out() {
        let result = next_weekday(anchor(), Weekday::Mon).unwrap();
        assert_eq!(fmt(result), "2023-05-22 Monday 12:00");
    }

    #[test]
    fn test_next_sunday() {
        let result = next_weekday(anchor(), Weekday::Sun).unwrap();
        assert_eq!(fmt(result), "2023-05-21 Sunday 12:00");
    }

    // ── next_day_of_month ───────────────────────────────────────────────

    #[test]
    fn test_next_day_later_this_month() {
        let result = next_day_of_month(at(2024, 8, 1), 30).unwrap();
        assert_eq!(fmt(result), "2024-08-30 Friday 12:00");
    }

    #[test]
    fn test_next_day_already_passed_rolls_to_next_month() {
        let result = next_day_of_month(anchor(), 3).unwrap();
        assert_eq!(fmt(result), "2023-06-03 Saturday 12:00");
    }

    #[test]
    fn test_next_day_today_rolls_to_next_month() {
        let result = next_day_of_month(anchor(), 15).unwrap();
        assert_eq!(fmt(result), "2023-06-15 Thursday 12:00");
    }

    #[test]
    fn test_next_day_skips_short_months() {
        // June has no 31st
        let result = next_day_of_month(at(2023, 5, 31), 31).unwrap();
        assert_eq!(fmt(result), "2023-07-31 Monday 12:00");
    }

    #[test]
    fn test_next_day_across_year_end() {
        let result = next_day_of_month(at(2023, 12, 20), 5).unwrap();
        assert_eq!(fmt(result), "2024-01-05 Friday 12:00");
    }

    #[test]
    fn test_next_day_out_of_range() {
        assert!(next_day_of_month(anchor(), 0).is_err());
        assert!(next_day_of_month(anchor(), 32).is_err());
    }

    // ── next_date ───────────────────────────────────────────────────────

    #[test]
    fn test_next_date_later_this_year() {
        let result = next_date(anchor(), 16, 9).unwrap();
        assert_eq!(fmt(result), "2023-09-16 Saturday 12:00");
    }

    #[test]
    fn test_next_date_passed_rolls_to_next_year() {
        let result = next_date(anchor(), 16, 2).unwrap();
        assert_eq!(fmt(result), "2024-02-16 Friday 12:00");
    }

    #[test]
    fn test_next_date_leap_day() {
        let result = next_date(anchor(), 29, 2).unwrap();
        assert_eq!(fmt(result), "2024-02-29 Thursday 12:00");
    }

    #[test]
    fn test_next_date_impossible_day() {
        let err = next_date(anchor(), 30, 2).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidDate(_)), "got: {err}");
        let err = next_date(anchor(), 31, 4).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidDate(_)), "got: {err}");
    }

    #[test]
    fn test_next_date_bad_month() {
        let err = next_date(anchor(), 1, 13).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidArgument(_)), "got: {err}");
    }

    // ── nth_weekday_of_month ────────────────────────────────────────────

    #[test]
    fn test_first_monday_of_past_month_is_next_year() {
        let result = nth_weekday_of_month(at(2023, 8, 15), 7, 1, Weekday::Mon).unwrap();
        assert_eq!(fmt(result), "2024-07-01 Monday 12:00");
    }

    #[test]
    fn test_second_friday_of_future_month() {
        let result = nth_weekday_of_month(anchor(), 7, 2, Weekday::Fri).unwrap();
        assert_eq!(fmt(result), "2023-07-14 Friday 12:00");
    }

    #[test]
    fn test_current_month_stays_in_current_year() {
        let result = nth_weekday_of_month(anchor(), 5, 1, Weekday::Mon).unwrap();
        assert_eq!(fmt(result), "2023-05-01 Monday 12:00");
    }

    #[test]
    fn test_fifth_weekday_missing_is_error() {
        // February 2024 has four Mondays
        let err = nth_weekday_of_month(at(2024, 1, 1), 2, 5, Weekday::Mon).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidDate(_)), "got: {err}");
    }

    #[test]
    fn test_huge_week_is_error() {
        let err = nth_weekday_of_month(anchor(), 7, u32::MAX, Weekday::Mon).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidDate(_)), "got: {err}");
        let err = weekday_range(anchor(), 7, u32::MAX, Weekday::Mon, Weekday::Fri).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidDate(_)), "got: {err}");
    }

    #[test]
    fn test_week_zero_is_error() {
        let err = nth_weekday_of_month(anchor(), 7, 0, Weekday::Mon).unwrap_err();
        assert!(matches!(err, Text2TimeError::InvalidArgument(_)), "got: {err}");
    }

    // ── weekday_range ───────────────────────────────────────────────────

    #[test]
    fn test_range_first_week() {
        let interval = weekday_range(anchor(), 8, 1, Weekday::Mon, Weekday::Thu).unwrap();
        assert_eq!(fmt(interval.start), "2023-08-07 Monday 12:00");
        assert_eq!(fmt(interval.end), "2023-08-10 Thursday 12:00");
    }

    #[test]
    fn test_range_second_week() {
        let interval = weekday_range(anchor(), 9, 2, Weekday::Mon, Weekday::Thu).unwrap();
        assert_eq!(fmt(interval.start), "2023-09-11 Monday 12:00");
        assert_eq!(fmt(interval.end), "2023-09-14 Thursday 12:00");
    }

    #[test]
    fn test_range_wraps_over_weekend() {
        let interval = weekday_range(anchor(), 8, 1, Weekday::Fri, Weekday::Mon).unwrap();
        assert_eq!(fmt(interval.start), "2023-08-04 Friday 12:00");
        assert_eq!(fmt(interval.end), "2023-08-07 Monday 12:00");
    }

    #[test]
    fn test_range_single_day() {
        let interval = weekday_range(anchor(), 8, 1, Weekday::Wed, Weekday::Wed).unwrap();
        assert_eq!(interval.start, interval.end);
    }
}
