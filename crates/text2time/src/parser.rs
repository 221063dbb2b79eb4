//! The phrase dispatcher.
//!
//! [`Text2Time`] holds an immutable [`ParserOptions`] (anchor, occurrence
//! count, seconds precision) and routes each phrase to the resolver or to
//! the recurrence compiler and expander.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, Text2TimeError};
use crate::expander::expand;
use crate::phrase::Phrase;
use crate::recurrence::compile;
use crate::resolver;

/// Leading keywords that `next` passes through untouched.
const RESERVED_KEYWORDS: [&str; 4] = ["next", "add", "now", "every"];

/// Parser configuration, fixed for the lifetime of a [`Text2Time`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// The reference "now" every phrase resolves against.
    pub anchor: NaiveDateTime,
    /// How many upcoming occurrences a recurrence phrase expands to.
    pub occurrence_count: usize,
    /// Emit six-field (second-first) recurrence expressions instead of five.
    pub include_seconds: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            anchor: Local::now().naive_local(),
            occurrence_count: 60,
            include_seconds: true,
        }
    }
}

impl ParserOptions {
    /// Default options anchored at `anchor`.
    pub fn at(anchor: NaiveDateTime) -> Self {
        Self {
            anchor,
            ..Self::default()
        }
    }

    pub fn with_occurrence_count(mut self, count: usize) -> Self {
        self.occurrence_count = count;
        self
    }

    pub fn with_seconds(mut self, include_seconds: bool) -> Self {
        self.include_seconds = include_seconds;
        self
    }
}

/// The outcome of parsing a phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// The resolved date, or the first occurrence of a recurrence.
    pub date: NaiveDateTime,
    /// End of the interval, for range phrases only.
    pub ends: Option<NaiveDateTime>,
    /// Upcoming occurrences, for recurrence phrases only.
    pub next: Vec<NaiveDateTime>,
}

impl ParseResult {
    fn single(date: NaiveDateTime) -> Self {
        Self {
            date,
            ends: None,
            next: Vec::new(),
        }
    }
}

/// Natural-language scheduling phrase parser.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use text2time::{ParserOptions, Text2Time};
///
/// let anchor = NaiveDate::from_ymd_opt(2023, 5, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let parser = Text2Time::new(ParserOptions::at(anchor));
///
/// let result = parser.next("tuesday").unwrap();
/// assert_eq!(result.date.format("%Y-%m-%d %A %H:%M").to_string(), "2023-05-16 Tuesday 12:00");
///
/// assert_eq!(parser.every("friday").unwrap(), "0 0 0 * * 5");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Text2Time {
    options: ParserOptions,
}

impl Text2Time {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn anchor(&self) -> NaiveDateTime {
        self.options.anchor
    }

    /// Parse a phrase whose leading `next` may be omitted: `"tuesday"` is
    /// read as `"next tuesday"`. Phrases already starting with `next`,
    /// `add`, `now` or `every` are parsed as given.
    ///
    /// # Errors
    ///
    /// Same as [`Text2Time::parse`].
    pub fn next(&self, phrase: &str) -> Result<ParseResult> {
        let lowered = phrase.trim().to_lowercase();
        let keyword = lowered.split_whitespace().next().unwrap_or_default();
        if RESERVED_KEYWORDS.contains(&keyword) {
            self.parse(&lowered)
        } else {
            self.parse(&format!("next {lowered}"))
        }
    }

    /// Parse a phrase that starts with its keyword (`next`, `add`, `now`,
    /// `every`).
    ///
    /// # Errors
    ///
    /// Returns [`Text2TimeError::Unrecognized`] if the phrase matches no
    /// known shape, [`Text2TimeError::InvalidArgument`] for malformed
    /// numbers, [`Text2TimeError::InvalidDate`] if the date cannot be built,
    /// and [`Text2TimeError::InvalidExpression`] if a recurrence cannot be
    /// expanded.
    pub fn parse(&self, phrase: &str) -> Result<ParseResult> {
        let classified = Phrase::classify(phrase)?;
        debug!(phrase, ?classified, "classified phrase");

        let anchor = self.options.anchor;
        let result = match classified {
            Phrase::Now => ParseResult::single(anchor),
            Phrase::RelativeOffset { amount, unit } => {
                ParseResult::single(resolver::add_offset(anchor, amount, unit)?)
            }
            Phrase::AbsoluteWeekday { weekday } => {
                ParseResult::single(resolver::next_weekday(anchor, weekday)?)
            }
            Phrase::AbsoluteDayOfMonth { day } => {
                ParseResult::single(resolver::next_day_of_month(anchor, day)?)
            }
            Phrase::AbsoluteDate { day, month } => {
                ParseResult::single(resolver::next_date(anchor, day, month)?)
            }
            Phrase::NthWeekdayOfMonth {
                month,
                week,
                weekday,
            } => ParseResult::single(resolver::nth_weekday_of_month(
                anchor, month, week, weekday,
            )?),
            Phrase::WeekdayRange {
                month,
                week,
                start,
                end,
            } => {
                let interval = resolver::weekday_range(anchor, month, week, start, end)?;
                ParseResult {
                    date: interval.start,
                    ends: Some(interval.end),
                    next: Vec::new(),
                }
            }
            Phrase::Recurrence { body } => self.recurrence(&body)?,
        };

        Ok(result)
    }

    /// Compile a recurrence phrase ("every friday at 9:00", or just
    /// "friday at 9:00") into its expression string.
    ///
    /// # Errors
    ///
    /// Returns [`Text2TimeError::InvalidArgument`] for out-of-range values.
    pub fn every(&self, phrase: &str) -> Result<String> {
        let expression = compile(phrase)?.render(self.options.include_seconds);
        debug!(phrase, expression = %expression, "compiled recurrence");
        Ok(expression)
    }

    /// Compile and expand. `date` is always the first occurrence, even when
    /// the configured occurrence count is zero.
    fn recurrence(&self, body: &str) -> Result<ParseResult> {
        let expression = self.every(body)?;
        let count = self.options.occurrence_count;
        let mut next = expand(&expression, self.options.anchor, count.max(1))?;
        let date = next.first().copied().ok_or_else(|| {
            Text2TimeError::InvalidExpression(format!("'{expression}' has no occurrences"))
        })?;
        next.truncate(count);
        Ok(ParseResult {
            date,
            ends: None,
            next,
        })
    }
}
