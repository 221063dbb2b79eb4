//! Recurrence compilation: phrase → cron-style expression.
//!
//! A phrase is run through a fixed pipeline of stages, each a pure
//! transform over [`RecurrenceFields`]. Stages run in order and a later
//! stage may overwrite what an earlier one set:
//!
//! 1. time (`4:04`, `00:05:10`) → second, minute, hour
//! 2. month name → month
//! 3. weekday range (`mon to fri`) or weekday set (`friday and monday`) → day-of-week
//! 4. `day <N>` → day-of-month
//! 5. interval (`3 months`, `5 minutes`) → step fields, overriding the above
//! 6. wraparound (`5-1` → `5-7,0-1`)
//! 7. calendar check: a literal day must exist in a literal month
//!
//! Names match whole words only, so `month` never reads as `mon` and
//! `october` never reads as `to`.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

use crate::error::{Result, Text2TimeError};
use crate::vocab::{self, MONTHS, WEEKDAYS};

/// The six fields of a recurrence expression, in output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceFields {
    pub second: String,
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
}

impl Default for RecurrenceFields {
    /// Midnight, every day.
    fn default() -> Self {
        Self {
            second: "0".to_string(),
            minute: "0".to_string(),
            hour: "0".to_string(),
            day_of_month: ANY.to_string(),
            month: ANY.to_string(),
            day_of_week: ANY.to_string(),
        }
    }
}

impl RecurrenceFields {
    /// Join the fields, dropping the leading second field unless
    /// `include_seconds` is set.
    pub fn render(&self, include_seconds: bool) -> String {
        let fields = [
            &self.second,
            &self.minute,
            &self.hour,
            &self.day_of_month,
            &self.month,
            &self.day_of_week,
        ];
        let skip = usize::from(!include_seconds);
        fields[skip..]
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RecurrenceFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

const ANY: &str = "*";

type Stage = fn(&str, RecurrenceFields) -> Result<RecurrenceFields>;

/// The compiler pipeline, in precedence order (later wins).
const STAGES: [(&str, Stage); 7] = [
    ("time", apply_time),
    ("month", apply_month),
    ("day_of_week", apply_day_of_week),
    ("day_of_month", apply_day_of_month),
    ("interval", apply_interval),
    ("wraparound", normalize_wraparound),
    ("calendar", check_calendar),
];

/// Compile a recurrence phrase into its fields.
///
/// A phrase with nothing recognizable compiles to the defaults (midnight,
/// every day), which is also what "every day" means.
///
/// # Errors
///
/// Returns [`Text2TimeError::InvalidArgument`] for out-of-range times or
/// days-of-month, for a zero interval and for a day the named month never
/// has (`february day 30`).
///
/// # Examples
///
/// ```
/// use text2time::recurrence::compile;
///
/// let fields = compile("3 months day 5 at 4:04").unwrap();
/// assert_eq!(fields.to_string(), "0 4 4 5 */3 *");
/// assert_eq!(fields.render(false), "4 4 5 */3 *");
/// ```
pub fn compile(phrase: &str) -> Result<RecurrenceFields> {
    let phrase = phrase.to_lowercase();
    STAGES
        .iter()
        .try_fold(RecurrenceFields::default(), |fields, (name, stage)| {
            let fields = stage(&phrase, fields)?;
            trace!(stage = *name, fields = %fields, "recurrence stage applied");
            Ok(fields)
        })
}

// ── Patterns ────────────────────────────────────────────────────────────────

struct Patterns {
    time: Regex,
    day_of_month: Regex,
    interval: Regex,
    range_separator: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        // 4:04, 14:15:00
        time: Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?").unwrap(),
        // day 5 (but not the hour in "day 5:00")
        day_of_month: Regex::new(r"\bday (\d+)(:?)").unwrap(),
        // 3 months, 5 days, 2 hours, 10 minutes, 30 sec
        interval: Regex::new(r"\b(\d+) (month|day|hou|min|sec)").unwrap(),
        range_separator: Regex::new(r"\bto\b").unwrap(),
    })
}

// ── Stages ──────────────────────────────────────────────────────────────────

fn apply_time(phrase: &str, mut fields: RecurrenceFields) -> Result<RecurrenceFields> {
    let Some(caps) = patterns().time.captures(phrase) else {
        return Ok(fields);
    };

    let hour = bounded(&caps[1], 23, "hour")?;
    let minute = bounded(&caps[2], 59, "minute")?;
    let second = match caps.get(3) {
        Some(m) => bounded(m.as_str(), 59, "second")?,
        None => 0,
    };

    fields.hour = hour.to_string();
    fields.minute = minute.to_string();
    fields.second = second.to_string();
    Ok(fields)
}

fn apply_month(phrase: &str, mut fields: RecurrenceFields) -> Result<RecurrenceFields> {
    let found = MONTHS
        .iter()
        .find(|term| vocab::words(phrase).any(|word| vocab::names_term(*term, word)));
    if let Some(term) = found {
        fields.month = term.value.to_string();
    }
    Ok(fields)
}

fn apply_day_of_week(phrase: &str, mut fields: RecurrenceFields) -> Result<RecurrenceFields> {
    let mut halves = patterns().range_separator.splitn(phrase, 2);
    if let (Some(left), Some(right)) = (halves.next(), halves.next()) {
        if let (Some(start), Some(end)) = (first_weekday(left), first_weekday(right)) {
            fields.day_of_week = format!("{start}-{end}");
            return Ok(fields);
        }
    }

    let named: Vec<String> = WEEKDAYS
        .iter()
        .filter(|term| vocab::words(phrase).any(|word| vocab::names_term(*term, word)))
        .map(|term| vocab::weekday_ordinal(term.value).to_string())
        .collect();
    if !named.is_empty() {
        fields.day_of_week = named.join(",");
    }
    Ok(fields)
}

fn apply_day_of_month(phrase: &str, mut fields: RecurrenceFields) -> Result<RecurrenceFields> {
    let found = patterns()
        .day_of_month
        .captures_iter(phrase)
        .find(|caps| caps[2].is_empty());
    if let Some(caps) = found {
        let day = bounded(&caps[1], 31, "day of month")?;
        if day == 0 {
            return Err(Text2TimeError::InvalidArgument(
                "day of month starts at 1".to_string(),
            ));
        }
        fields.day_of_month = day.to_string();
    }
    Ok(fields)
}

fn apply_interval(phrase: &str, mut fields: RecurrenceFields) -> Result<RecurrenceFields> {
    let Some(caps) = patterns().interval.captures(phrase) else {
        return Ok(fields);
    };

    let step: u32 = caps[1].parse().map_err(|_| {
        Text2TimeError::InvalidArgument(format!("interval '{}' is too large", &caps[1]))
    })?;
    if step == 0 {
        return Err(Text2TimeError::InvalidArgument(
            "interval must be at least 1".to_string(),
        ));
    }
    let every = format!("*/{step}");

    match &caps[2] {
        "month" => {
            fields.month = every;
            if fields.day_of_month == ANY {
                fields.day_of_month = "1".to_string();
            }
            fields.day_of_week = ANY.to_string();
        }
        "day" => fields.day_of_month = every,
        "hou" => fields.hour = every,
        "min" => {
            fields.minute = every;
            fields.hour = ANY.to_string();
        }
        "sec" => {
            fields.second = every;
            fields.minute = ANY.to_string();
            fields.hour = ANY.to_string();
        }
        _ => {}
    }
    Ok(fields)
}

/// Rewrite a backwards day-of-week range (`5-1`, Friday to Monday) as two
/// segments through the end of the week (`5-7,0-1`). 7 is Sunday.
fn normalize_wraparound(_phrase: &str, mut fields: RecurrenceFields) -> Result<RecurrenceFields> {
    let wrapped = fields
        .day_of_week
        .split_once('-')
        .and_then(|(start, end)| Some((start.parse::<u32>().ok()?, end.parse::<u32>().ok()?)))
        .filter(|(start, end)| start > end)
        .map(|(start, end)| format!("{start}-7,0-{end}"));
    if let Some(day_of_week) = wrapped {
        fields.day_of_week = day_of_week;
    }
    Ok(fields)
}

fn check_calendar(_phrase: &str, fields: RecurrenceFields) -> Result<RecurrenceFields> {
    let (Ok(month), Ok(day)) = (fields.month.parse::<u32>(), fields.day_of_month.parse::<u32>())
    else {
        return Ok(fields);
    };
    // 2000 is a leap year, so only days no year has are rejected
    if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
        return Err(Text2TimeError::InvalidArgument(format!(
            "month {month} never has day {day}"
        )));
    }
    Ok(fields)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// First weekday named in `text`, by table order.
fn first_weekday(text: &str) -> Option<u32> {
    WEEKDAYS
        .iter()
        .find(|term| vocab::words(text).any(|word| vocab::names_term(*term, word)))
        .map(|term| vocab::weekday_ordinal(term.value))
}

fn bounded(digits: &str, max: u32, what: &str) -> Result<u32> {
    digits
        .parse::<u32>()
        .ok()
        .filter(|value| *value <= max)
        .ok_or_else(|| Text2TimeError::InvalidArgument(format!("{what} {digits} exceeds {max}")))
}
