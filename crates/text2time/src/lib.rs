//! # text2time
//!
//! Natural-language scheduling phrases to concrete dates and recurrences.
//!
//! `text2time` reads short phrases such as "next tuesday", "add 2 weeks",
//! "august monday to thursday" or "every 3 months day 5 at 4:04" and turns
//! them into a single future date, a date interval, or a cron-style
//! recurrence expression with its upcoming occurrences. Everything resolves
//! against an explicit anchor ("now"), so results are deterministic.
//!
//! ## Modules
//!
//! - [`parser`] - [`Text2Time`], the keyword dispatcher, and its options
//! - [`phrase`] - Phrase classification into tagged [`Phrase`] shapes
//! - [`resolver`] - Single-date and interval resolution against the anchor
//! - [`recurrence`] - Phrase → six-field recurrence expression
//! - [`expander`] - Recurrence expression → upcoming occurrences
//! - [`vocab`] - Weekday, month and week-ordinal vocabulary
//! - [`error`] - Error types

pub mod error;
pub mod expander;
pub mod parser;
pub mod phrase;
pub mod recurrence;
pub mod resolver;
pub mod vocab;

pub use error::{Result, Text2TimeError};
pub use expander::expand;
pub use parser::{ParseResult, ParserOptions, Text2Time};
pub use phrase::{OffsetUnit, Phrase};
pub use recurrence::{compile, RecurrenceFields};
pub use resolver::{
    add_offset, next_date, next_day_of_month, next_weekday, nth_weekday_of_month, weekday_range,
    Interval,
};
