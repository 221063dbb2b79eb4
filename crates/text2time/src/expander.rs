//! Occurrence expansion: recurrence expression → concrete timestamps.
//!
//! Iteration itself is delegated to [`croner`]. Timestamps are naive
//! wall-clock values; they are handed to `croner` as UTC so no offset or DST
//! shift ever applies.

use chrono::NaiveDateTime;
use croner::Cron;
use tracing::debug;

use crate::error::{Result, Text2TimeError};

/// Expand `expression` into its next `count` occurrences strictly after
/// `anchor`.
///
/// Accepts five-field (minute-first) and six-field (second-first)
/// expressions. Day-of-week accepts 0-7, with both 0 and 7 meaning Sunday.
/// The result is strictly increasing and has exactly `count` entries.
///
/// # Errors
///
/// Returns [`Text2TimeError::InvalidExpression`] if the expression cannot be
/// parsed or runs out of occurrences.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use text2time::expander::expand;
///
/// let anchor = NaiveDate::from_ymd_opt(2023, 5, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let next = expand("0 4 4 5 */3 *", anchor, 2).unwrap();
/// assert_eq!(next[0].to_string(), "2023-07-05 04:04:00");
/// assert_eq!(next[1].to_string(), "2023-10-05 04:04:00");
/// ```
pub fn expand(expression: &str, anchor: NaiveDateTime, count: usize) -> Result<Vec<NaiveDateTime>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let cron = Cron::new(expression)
        .with_seconds_optional()
        .parse()
        .map_err(|e| Text2TimeError::InvalidExpression(format!("'{expression}': {e}")))?;

    let mut cursor = anchor.and_utc();
    let mut occurrences = Vec::with_capacity(count);
    for _ in 0..count {
        cursor = cron.find_next_occurrence(&cursor, false).map_err(|e| {
            Text2TimeError::InvalidExpression(format!("'{expression}' after {cursor}: {e}"))
        })?;
        occurrences.push(cursor.naive_utc());
    }

    debug!(expression, %anchor, count, "expanded occurrences");
    Ok(occurrences)
}
