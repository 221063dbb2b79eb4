//! Phrase classification.
//!
//! Turns a normalized, whitespace-tokenized phrase into a [`Phrase`]: one
//! variant per phrase shape, each carrying only the fields its resolver
//! needs. Classification is first-match by leading keyword, then by the
//! shape rules of that keyword family.

use chrono::Weekday;

use crate::error::{Result, Text2TimeError};
use crate::vocab;

/// Unit of a relative offset ("add 2 weeks").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Days,
    Weeks,
    Months,
}

impl OffsetUnit {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "day" | "days" => Some(Self::Days),
            "week" | "weeks" => Some(Self::Weeks),
            "month" | "months" => Some(Self::Months),
            _ => None,
        }
    }
}

/// A classified scheduling phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phrase {
    /// `now`
    Now,
    /// `add 2 weeks`
    RelativeOffset { amount: i64, unit: OffsetUnit },
    /// `next tuesday`
    AbsoluteWeekday { weekday: Weekday },
    /// `next 30`
    AbsoluteDayOfMonth { day: u32 },
    /// `next 16 september`
    AbsoluteDate { day: u32, month: u32 },
    /// `next july second week friday`
    NthWeekdayOfMonth {
        month: u32,
        week: u32,
        weekday: Weekday,
    },
    /// `next august first monday to thursday`
    WeekdayRange {
        month: u32,
        week: u32,
        start: Weekday,
        end: Weekday,
    },
    /// `every 3 months day 5 at 4:04` (the whole phrase is kept for the compiler)
    Recurrence { body: String },
}

impl Phrase {
    /// Classify a phrase.
    ///
    /// # Errors
    ///
    /// Returns [`Text2TimeError::Unrecognized`] when no rule matches or a
    /// matched shape names an unknown month or weekday, and
    /// [`Text2TimeError::InvalidArgument`] when a numeric field is malformed.
    pub fn classify(phrase: &str) -> Result<Phrase> {
        let normalized = phrase.trim().to_lowercase();
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        match tokens.first().copied() {
            Some("every") => Ok(Phrase::Recurrence {
                body: tokens.join(" "),
            }),
            Some("next") => classify_next(&tokens, phrase),
            Some("add") => classify_add(&tokens, phrase),
            Some("now") if tokens.len() == 1 => Ok(Phrase::Now),
            _ => Err(unrecognized(phrase)),
        }
    }
}

fn unrecognized(phrase: &str) -> Text2TimeError {
    Text2TimeError::Unrecognized(format!("'{}'", phrase.trim()))
}

/// Rules for `next ...`, in precedence order.
fn classify_next(tokens: &[&str], phrase: &str) -> Result<Phrase> {
    if tokens.contains(&"week") {
        let month = month_at(tokens, 1, phrase)?;
        let week = week_at(tokens, 2);
        let weekday = weekday_at(tokens, tokens.len() - 1, phrase)?;
        return Ok(Phrase::NthWeekdayOfMonth {
            month,
            week,
            weekday,
        });
    }

    if tokens.contains(&"to") {
        let month = month_at(tokens, 1, phrase)?;
        let week = week_at(tokens, 2);
        let start_index = tokens.len().checked_sub(3).ok_or_else(|| unrecognized(phrase))?;
        let start = weekday_at(tokens, start_index, phrase)?;
        let end = weekday_at(tokens, tokens.len() - 1, phrase)?;
        return Ok(Phrase::WeekdayRange {
            month,
            week,
            start,
            end,
        });
    }

    if let Some(month) = tokens.get(2).and_then(|t| vocab::month(t)) {
        let day = parse_day(tokens[1])?;
        return Ok(Phrase::AbsoluteDate { day, month });
    }

    if let Some(weekday) = tokens.get(1).and_then(|t| vocab::weekday(t)) {
        return Ok(Phrase::AbsoluteWeekday { weekday });
    }

    if tokens.len() == 2 && looks_numeric(tokens[1]) {
        let day = parse_day(tokens[1])?;
        return Ok(Phrase::AbsoluteDayOfMonth { day });
    }

    Err(unrecognized(phrase))
}

/// `add <amount> <unit>`
fn classify_add(tokens: &[&str], phrase: &str) -> Result<Phrase> {
    let raw = tokens.get(1).ok_or_else(|| {
        Text2TimeError::InvalidArgument(format!("missing amount in '{}'", phrase.trim()))
    })?;
    let amount: i64 = raw.parse().map_err(|_| {
        Text2TimeError::InvalidArgument(format!("amount '{raw}' is not a whole number"))
    })?;
    let unit = tokens
        .get(2)
        .and_then(|t| OffsetUnit::from_word(t))
        .ok_or_else(|| unrecognized(phrase))?;
    Ok(Phrase::RelativeOffset { amount, unit })
}

fn month_at(tokens: &[&str], index: usize, phrase: &str) -> Result<u32> {
    tokens
        .get(index)
        .and_then(|t| vocab::month(t))
        .ok_or_else(|| unrecognized(phrase))
}

fn weekday_at(tokens: &[&str], index: usize, phrase: &str) -> Result<Weekday> {
    tokens
        .get(index)
        .and_then(|t| vocab::weekday(t))
        .ok_or_else(|| unrecognized(phrase))
}

/// Week ordinal at `index`, defaulting to the first week.
fn week_at(tokens: &[&str], index: usize) -> u32 {
    tokens
        .get(index)
        .and_then(|t| vocab::week_ordinal(t))
        .unwrap_or(1)
}

fn looks_numeric(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit())
}

/// Parse a day-of-month token: "16", "16th", "1st".
fn parse_day(token: &str) -> Result<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    let day: u32 = digits.parse().map_err(|_| {
        Text2TimeError::InvalidArgument(format!("day '{token}' is not a number"))
    })?;
    if !(1..=31).contains(&day) {
        return Err(Text2TimeError::InvalidArgument(format!(
            "day {day} is outside 1-31"
        )));
    }
    Ok(day)
}
